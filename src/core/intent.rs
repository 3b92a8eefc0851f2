//! # Intents
//!
//! Everything the interactive core wants changed in the shared workspace
//! becomes an `Intent`. Components never mutate folders or conversations
//! themselves; they hand an intent to whoever owns the data.
//!
//! ```text
//! FolderRow / Composer / Sidebar  ──Intent──▶  IntentSink::dispatch()  ──▶  Workspace
//! ```
//!
//! There is exactly one writer for the shared collections, so the core needs
//! no locking. It reads a snapshot and emits intents.

use crate::core::placement::ReassignmentIntent;
use crate::core::workspace::{ChatMessage, ItemKind};

/// Conversation settings that can be changed from outside the composer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationField {
    Model(String),
    Temperature(f32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreateFolder { kind: ItemKind, name: String },
    /// `name` is always non-empty and trimmed.
    RenameFolder { id: String, name: String },
    DeleteFolder { id: String },
    ReassignItem(ReassignmentIntent),
    SendMessage(ChatMessage),
    UpdateConversationField {
        conversation_id: String,
        field: ConversationField,
    },
    ClearConversations,
    NewConversation,
    SelectConversation { id: String },
    StopStreaming,
}

/// The typed callback bundle handed to components instead of a global store.
pub trait IntentSink {
    fn dispatch(&mut self, intent: Intent);
}

/// Collects intents instead of applying them. Useful for components that
/// are driven in isolation.
impl IntentSink for Vec<Intent> {
    fn dispatch(&mut self, intent: Intent) {
        self.push(intent);
    }
}
