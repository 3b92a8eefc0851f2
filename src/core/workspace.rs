//! # Workspace
//!
//! The owner of folders, conversations and prompts, and the only writer of
//! them. Components read a snapshot and send `Intent`s back here.
//!
//! ```text
//! Workspace
//! ├── folders: Vec<Folder>                // ordered, typed per item kind
//! ├── conversations: Vec<Conversation>    // folder_id is a weak reference
//! ├── prompts: Vec<Prompt>                // same shape as conversations
//! ├── selected_conversation: Option<id>
//! └── message_is_streaming: bool          // never persisted
//! ```
//!
//! Persisted as one JSON file (default `~/.nook/workspace.json`), written
//! atomically via `.tmp` + rename.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::intent::{ConversationField, Intent, IntentSink};
use crate::core::models::{DEFAULT_TEMPERATURE, clamp_temperature};

pub const DEFAULT_FOLDER_NAME: &str = "New folder";
pub const DEFAULT_CONVERSATION_NAME: &str = "New conversation";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ItemKind {
    #[serde(rename = "chat")]
    Conversation,
    #[serde(rename = "prompt")]
    Prompt,
}

impl ItemKind {
    /// Drag payload format name for items of this kind.
    pub fn payload_key(self) -> &'static str {
        match self {
            ItemKind::Conversation => "conversation",
            ItemKind::Prompt => "prompt",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, rename = "folderId")]
    pub folder_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Conversation {
    pub fn new(name: &str, model: Option<String>, temperature: f32) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            messages: Vec::new(),
            model,
            temperature,
            folder_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(id: &str, name: &str, folder_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            messages: Vec::new(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            folder_id: folder_id.map(str::to_string),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "folderId")]
    pub folder_id: Option<String>,
}

impl Prompt {
    pub fn with_id(id: &str, name: &str, content: &str, folder_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            content: content.to_string(),
            folder_id: folder_id.map(str::to_string),
        }
    }
}

/// Anything that can live inside a folder.
pub trait FolderMember {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn folder_id(&self) -> Option<&str>;
    fn set_folder_id(&mut self, folder_id: Option<String>);
}

impl FolderMember for Conversation {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }
    fn set_folder_id(&mut self, folder_id: Option<String>) {
        self.folder_id = folder_id;
    }
}

impl FolderMember for Prompt {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }
    fn set_folder_id(&mut self, folder_id: Option<String>) {
        self.folder_id = folder_id;
    }
}

/// Generate a new UUID v4 identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn matches_search<T: FolderMember>(item: &T, search_term: &str) -> bool {
    let term = search_term.trim();
    term.is_empty() || item.name().to_lowercase().contains(&term.to_lowercase())
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Workspace {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default)]
    pub selected_conversation: Option<String>,
    #[serde(skip)]
    pub message_is_streaming: bool,
    #[serde(skip)]
    pub default_model: Option<String>,
    #[serde(skip, default = "default_temperature")]
    pub default_temperature: f32,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            conversations: Vec::new(),
            prompts: Vec::new(),
            selected_conversation: None,
            message_is_streaming: false,
            default_model: None,
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Workspace {
    pub fn new(default_model: Option<String>, default_temperature: f32) -> Self {
        Self {
            default_model,
            default_temperature: clamp_temperature(default_temperature),
            ..Default::default()
        }
    }

    pub fn folders_of(&self, kind: ItemKind) -> impl Iterator<Item = &Folder> {
        self.folders.iter().filter(move |f| f.kind == kind)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Whether `folder_id` names an existing folder. Orphaned references
    /// display as "no folder".
    fn resolves(&self, folder_id: Option<&str>) -> bool {
        folder_id.is_some_and(|id| self.folder(id).is_some())
    }

    /// Conversations inside `folder_id` that match the search term.
    pub fn conversations_in(&self, folder_id: &str, search_term: &str) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| c.folder_id.as_deref() == Some(folder_id))
            .filter(|c| matches_search(*c, search_term))
            .collect()
    }

    /// Conversations not in any existing folder, newest first.
    pub fn unfoldered_conversations(&self, search_term: &str) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .rev()
            .filter(|c| !self.resolves(c.folder_id.as_deref()))
            .filter(|c| matches_search(*c, search_term))
            .collect()
    }

    pub fn prompts_in(&self, folder_id: &str, search_term: &str) -> Vec<&Prompt> {
        self.prompts
            .iter()
            .filter(|p| p.folder_id.as_deref() == Some(folder_id))
            .filter(|p| matches_search(*p, search_term))
            .collect()
    }

    /// Prompts not in any existing folder, newest first.
    pub fn unfoldered_prompts(&self, search_term: &str) -> Vec<&Prompt> {
        self.prompts
            .iter()
            .rev()
            .filter(|p| !self.resolves(p.folder_id.as_deref()))
            .filter(|p| matches_search(*p, search_term))
            .collect()
    }

    pub fn selected(&self) -> Option<&Conversation> {
        let id = self.selected_conversation.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    fn selected_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.selected_conversation.clone()?;
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn new_conversation(&mut self) -> &mut Conversation {
        let conversation = Conversation::new(
            DEFAULT_CONVERSATION_NAME,
            self.default_model.clone(),
            self.default_temperature,
        );
        self.selected_conversation = Some(conversation.id.clone());
        self.conversations.push(conversation);
        let last = self.conversations.len() - 1;
        &mut self.conversations[last]
    }

    fn send_message(&mut self, message: ChatMessage) {
        if self.message_is_streaming {
            warn!("Dropping message: a response is still streaming");
            return;
        }
        if self.selected().is_none() {
            self.new_conversation();
        }
        let Some(conversation) = self.selected_mut() else {
            return;
        };
        // First user message names an untitled conversation
        if conversation.messages.is_empty()
            && conversation.name == DEFAULT_CONVERSATION_NAME
            && let Some(first_line) = message
                .content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
        {
            conversation.name = first_line.chars().take(30).collect();
        }
        conversation.messages.push(message);
        debug!("Message appended to conversation {}", conversation.id);
    }

    fn update_conversation_field(&mut self, conversation_id: &str, field: ConversationField) {
        let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        else {
            debug!("Field update for unknown conversation {}", conversation_id);
            return;
        };
        match field {
            ConversationField::Model(model) => conversation.model = Some(model),
            ConversationField::Temperature(t) => conversation.temperature = clamp_temperature(t),
            ConversationField::Name(name) => {
                let name = name.trim();
                if !name.is_empty() {
                    conversation.name = name.to_string();
                }
            }
        }
    }
}

impl IntentSink for Workspace {
    fn dispatch(&mut self, intent: Intent) {
        debug!("Workspace intent: {:?}", intent);
        match intent {
            Intent::CreateFolder { kind, name } => {
                let name = name.trim();
                self.folders.push(Folder {
                    id: new_id(),
                    name: if name.is_empty() {
                        DEFAULT_FOLDER_NAME.to_string()
                    } else {
                        name.to_string()
                    },
                    kind,
                });
            }
            Intent::RenameFolder { id, name } => {
                let name = name.trim();
                if name.is_empty() {
                    warn!("Ignoring rename of folder {} to an empty name", id);
                    return;
                }
                if let Some(folder) = self.folders.iter_mut().find(|f| f.id == id) {
                    folder.name = name.to_string();
                }
            }
            Intent::DeleteFolder { id } => {
                self.folders.retain(|f| f.id != id);
                for c in &mut self.conversations {
                    if c.folder_id.as_deref() == Some(id.as_str()) {
                        c.folder_id = None;
                    }
                }
                for p in &mut self.prompts {
                    if p.folder_id.as_deref() == Some(id.as_str()) {
                        p.folder_id = None;
                    }
                }
            }
            Intent::ReassignItem(reassignment) => {
                if let Some(target) = reassignment.target.as_deref()
                    && self.folder(target).is_none()
                {
                    warn!("Ignoring reassignment into unknown folder {}", target);
                    return;
                }
                let changed = match reassignment.kind {
                    ItemKind::Conversation => reassignment.apply(&mut self.conversations),
                    ItemKind::Prompt => reassignment.apply(&mut self.prompts),
                };
                debug!(
                    "Reassigned {} -> {:?} (changed: {})",
                    reassignment.item_id, reassignment.target, changed
                );
            }
            Intent::SendMessage(message) => self.send_message(message),
            Intent::UpdateConversationField {
                conversation_id,
                field,
            } => self.update_conversation_field(&conversation_id, field),
            Intent::ClearConversations => {
                self.conversations.clear();
                self.selected_conversation = None;
                self.folders.retain(|f| f.kind != ItemKind::Conversation);
            }
            Intent::NewConversation => {
                self.new_conversation();
            }
            Intent::SelectConversation { id } => {
                if self.conversations.iter().any(|c| c.id == id) {
                    self.selected_conversation = Some(id);
                }
            }
            Intent::StopStreaming => self.message_is_streaming = false,
        }
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl Workspace {
    /// Load from `path`, or start empty if the file doesn't exist.
    pub fn load(
        path: &Path,
        default_model: Option<String>,
        default_temperature: f32,
    ) -> io::Result<Self> {
        let mut workspace = if path.exists() {
            let json = fs::read_to_string(path)?;
            let loaded: Workspace = serde_json::from_str(&json)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            info!(
                "Loaded workspace from {} ({} folders, {} conversations)",
                path.display(),
                loaded.folders.len(),
                loaded.conversations.len()
            );
            loaded
        } else {
            Workspace::default()
        };
        workspace.default_model = default_model;
        workspace.default_temperature = clamp_temperature(default_temperature);
        Ok(workspace)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        atomic_write_json(path, self)?;
        debug!("Workspace saved to {}", path.display());
        Ok(())
    }
}
