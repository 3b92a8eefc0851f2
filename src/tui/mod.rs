//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, draws the workspace and
//! turns keyboard and mouse input into [`Intent`]s applied to it.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Routing
//!
//! 1. Ctrl+C quits from anywhere.
//! 2. An open overlay (model picker, prompt variables, code blocks) takes
//!    every other event.
//! 3. Global shortcuts (Ctrl+N, Ctrl+L, Ctrl+Y, Ctrl+R, Ctrl+X, scrolling).
//! 4. Mouse events go to whatever region is under the pointer; a drag in
//!    progress stays with the sidebar.
//! 5. Everything else goes to the focused pane (Tab cycles).
//!
//! ## Redraw Strategy
//!
//! Draws only when something changed. The poll timeout drops to 100ms while
//! dictation, a notice or a "Copied!" indicator needs timely updates, and is
//! 500ms otherwise.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::capture::device_for;
use crate::core::clipboard::{SystemClipboard, code_blocks};
use crate::core::config::ResolvedConfig;
use crate::core::intent::{ConversationField, Intent, IntentSink};
use crate::core::models::{ModelInfo, resolve_model};
use crate::core::speech::{CaptureDevice, SpeechState};
use crate::core::variables::VariableForm;
use crate::core::workspace::{Role, Workspace};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    CodeBlocksEvent, CodeBlocksState, Composer, ComposerEvent, MessageListState,
    ModelPickerEvent, ModelPickerState, Sidebar, SidebarEvent, SidebarState, VariableModalEvent,
    VariableModalState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::AppLayout;

const NOTICE_TTL: Duration = Duration::from_secs(4);
const FAST_POLL: Duration = Duration::from_millis(100);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Which pane receives keys that no overlay or shortcut claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Sidebar,
    /// Arrow keys scroll the conversation. Typing jumps back to the composer.
    Messages,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Composer => Focus::Sidebar,
            Focus::Sidebar => Focus::Messages,
            Focus::Messages => Focus::Composer,
        }
    }
}

pub enum Overlay {
    ModelPicker(ModelPickerState),
    Variables(VariableModalState),
    CodeBlocks(CodeBlocksState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// TUI-specific presentation state (not part of the persisted workspace)
pub struct TuiState {
    // Persistent component states
    pub sidebar: SidebarState,
    pub message_list: MessageListState,
    pub composer: Composer,
    pub focus: Focus,
    pub overlay: Option<Overlay>,
    /// Installed models, from the config file
    pub models: Vec<ModelInfo>,
    /// Regions from the last frame
    pub layout: AppLayout,
    /// Workspace changed since the last save
    pub dirty: bool,
    notice: Option<(String, Instant)>,
    /// Conversation the message list was last laid out for
    shown_conversation: Option<String>,
    /// Where saved code blocks go
    save_dir: PathBuf,
}

impl TuiState {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        narrow_width: u16,
        composer_max_lines: u16,
        models: Vec<ModelInfo>,
        save_dir: PathBuf,
    ) -> Self {
        Self {
            sidebar: SidebarState::new(),
            message_list: MessageListState::new(),
            composer: Composer::new(device, narrow_width, composer_max_lines),
            focus: Focus::Composer, // User expects to type immediately
            overlay: None,
            models,
            layout: AppLayout::default(),
            dirty: false,
            notice: None,
            shown_conversation: None,
            save_dir,
        }
    }

    pub fn notice_text(&self) -> &str {
        self.notice.as_ref().map_or("", |(text, _)| text.as_str())
    }

    fn set_notice(&mut self, text: String) {
        debug!("Notice: {}", text);
        self.notice = Some((text, Instant::now()));
    }

    fn apply(&mut self, workspace: &mut Workspace, intent: Intent) {
        debug!("Applying {:?}", intent);
        workspace.dispatch(intent);
        self.dirty = true;
    }

    /// Push props into components and reconcile derived state. Returns true
    /// if anything visible changed.
    pub fn sync(&mut self, workspace: &mut Workspace, viewport_width: u16) -> bool {
        let mut changed = false;

        self.composer.streaming = workspace.message_is_streaming;
        self.composer.viewport_width = viewport_width;
        self.composer.focused = self.focus == Focus::Composer && self.overlay.is_none();
        self.sidebar.focused = self.focus == Focus::Sidebar && self.overlay.is_none();

        if self.shown_conversation != workspace.selected_conversation {
            self.shown_conversation = workspace.selected_conversation.clone();
            self.message_list.reset();
            changed = true;
        }

        let (_, fallback) = resolve_model(&self.models, workspace.selected());
        if let Some(intent) = fallback {
            info!("Selected conversation's model is not installed, falling back");
            self.apply(workspace, intent);
            changed = true;
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
            changed = true;
        }
        changed
    }

    /// Drain dictation and copy-indicator updates. Returns true if a redraw
    /// is needed.
    pub fn pump(&mut self, workspace: &mut Workspace) -> bool {
        let mut changed = false;
        for event in self.composer.pump() {
            self.on_composer_event(workspace, event);
            changed = true;
        }
        if let Some(Overlay::CodeBlocks(state)) = &mut self.overlay {
            changed |= state.pump();
        }
        changed
    }

    fn poll_timeout(&self) -> Duration {
        let copied = matches!(&self.overlay, Some(Overlay::CodeBlocks(s)) if s.is_copied());
        if copied
            || self.notice.is_some()
            || self.composer.inner.speech_state() != SpeechState::Idle
        {
            FAST_POLL
        } else {
            IDLE_POLL
        }
    }

    pub fn teardown(&mut self) {
        self.composer.teardown();
        if let Some(Overlay::CodeBlocks(state)) = &mut self.overlay {
            state.teardown();
        }
    }

    pub fn handle_event(&mut self, workspace: &mut Workspace, event: TuiEvent) -> Flow {
        match event {
            TuiEvent::ForceQuit => return Flow::Quit,
            TuiEvent::Resize => return Flow::Continue,
            _ => {}
        }

        if self.overlay.is_some() {
            self.route_to_overlay(workspace, &event);
            return Flow::Continue;
        }

        match event {
            TuiEvent::NewConversation => {
                self.apply(workspace, Intent::NewConversation);
                self.focus = Focus::Composer;
            }
            TuiEvent::OpenModelPicker => self.open_model_picker(workspace),
            TuiEvent::OpenCodeBlocks => self.open_code_blocks(workspace),
            TuiEvent::ToggleDictation | TuiEvent::StopStreaming => {
                if let Some(e) = self.composer.handle_event(&event) {
                    self.on_composer_event(workspace, e);
                }
            }
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown
            | TuiEvent::JumpToBottom => {
                self.message_list.handle_event(&event);
            }
            TuiEvent::FocusNext => {
                self.focus = self.focus.next();
                debug!("Focus -> {:?}", self.focus);
            }
            TuiEvent::MouseDown(column, row) => self.mouse_down(workspace, &event, column, row),
            TuiEvent::MouseDrag(..) | TuiEvent::MouseUp(..) => {
                if self.layout.sidebar.is_some() {
                    self.route_to_sidebar(workspace, &event);
                }
            }
            _ => self.route_to_focus(workspace, event),
        }
        Flow::Continue
    }

    fn mouse_down(&mut self, workspace: &mut Workspace, event: &TuiEvent, column: u16, row: u16) {
        if self.layout.in_sidebar(column, row) {
            self.focus = Focus::Sidebar;
            self.route_to_sidebar(workspace, event);
        } else if self.layout.in_messages(column, row) {
            self.focus = Focus::Messages;
            self.message_list.handle_event(event);
        } else if self.layout.in_composer(column, row) {
            self.focus = Focus::Composer;
        }
    }

    fn route_to_focus(&mut self, workspace: &mut Workspace, event: TuiEvent) {
        match self.focus {
            Focus::Composer => {
                if let Some(e) = self.composer.handle_event(&event) {
                    self.on_composer_event(workspace, e);
                }
            }
            Focus::Sidebar => self.route_to_sidebar(workspace, &event),
            Focus::Messages => match event {
                TuiEvent::CursorUp => self.message_list.scroll.scroll_up(1),
                TuiEvent::CursorDown => self.message_list.scroll.scroll_down(1),
                TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                    self.focus = Focus::Composer;
                    self.route_to_focus(workspace, event);
                }
                TuiEvent::Submit => self.focus = Focus::Composer,
                _ => {}
            },
        }
    }

    fn route_to_sidebar(&mut self, workspace: &mut Workspace, event: &TuiEvent) {
        let result = Sidebar::new(&mut self.sidebar, workspace).handle_event(event);
        if let Some(e) = result {
            self.on_sidebar_event(workspace, e);
        }
    }

    fn route_to_overlay(&mut self, workspace: &mut Workspace, event: &TuiEvent) {
        match &mut self.overlay {
            Some(Overlay::ModelPicker(state)) => {
                if let Some(e) = state.handle_event(event) {
                    self.on_model_picker_event(workspace, e);
                }
            }
            Some(Overlay::Variables(state)) => {
                if let Some(e) = state.handle_event(event) {
                    self.on_variable_event(e);
                }
            }
            Some(Overlay::CodeBlocks(state)) => {
                if let Some(e) = state.handle_event(event) {
                    self.on_code_blocks_event(e);
                }
            }
            None => {}
        }
    }

    fn on_composer_event(&mut self, workspace: &mut Workspace, event: ComposerEvent) {
        match event {
            ComposerEvent::Send {
                message,
                release_focus,
            } => {
                self.apply(workspace, Intent::SendMessage(message));
                self.message_list.scroll.jump_to_bottom();
                if release_focus {
                    self.focus = Focus::Messages;
                }
            }
            ComposerEvent::StopStreaming => self.apply(workspace, Intent::StopStreaming),
            ComposerEvent::Notice(text) => self.set_notice(text),
            ComposerEvent::ContentChanged => {}
        }
    }

    fn on_sidebar_event(&mut self, workspace: &mut Workspace, event: SidebarEvent) {
        match event {
            SidebarEvent::Intent(intent) => {
                let opens_conversation = matches!(intent, Intent::SelectConversation { .. });
                self.apply(workspace, intent);
                if opens_conversation {
                    self.focus = Focus::Composer;
                }
            }
            SidebarEvent::UsePrompt(id) => self.use_prompt(workspace, &id),
            SidebarEvent::Notice(text) => self.set_notice(text),
        }
    }

    fn use_prompt(&mut self, workspace: &Workspace, id: &str) {
        let Some(prompt) = workspace.prompts.iter().find(|p| p.id == id) else {
            warn!("Prompt {} not found", id);
            return;
        };
        match VariableForm::for_prompt(&prompt.name, &prompt.description, &prompt.content) {
            Some(form) => self.overlay = Some(Overlay::Variables(VariableModalState::new(form))),
            None => {
                self.composer.set_text(prompt.content.clone());
                self.focus = Focus::Composer;
            }
        }
    }

    fn on_model_picker_event(&mut self, workspace: &mut Workspace, event: ModelPickerEvent) {
        let Some(conversation_id) = workspace.selected_conversation.clone() else {
            self.overlay = None;
            return;
        };
        match event {
            ModelPickerEvent::Select(name) => {
                self.apply(
                    workspace,
                    Intent::UpdateConversationField {
                        conversation_id,
                        field: ConversationField::Model(name),
                    },
                );
                self.overlay = None;
            }
            ModelPickerEvent::Temperature(value) => self.apply(
                workspace,
                Intent::UpdateConversationField {
                    conversation_id,
                    field: ConversationField::Temperature(value),
                },
            ),
            ModelPickerEvent::Dismiss => self.overlay = None,
        }
    }

    fn on_variable_event(&mut self, event: VariableModalEvent) {
        match event {
            VariableModalEvent::Submit(text) => {
                self.composer.set_text(text);
                self.overlay = None;
                self.focus = Focus::Composer;
            }
            VariableModalEvent::Notice(text) => self.set_notice(text),
            VariableModalEvent::Dismiss => self.overlay = None,
        }
    }

    fn on_code_blocks_event(&mut self, event: CodeBlocksEvent) {
        match event {
            CodeBlocksEvent::Notice(text) => self.set_notice(text),
            CodeBlocksEvent::Dismiss => {
                if let Some(Overlay::CodeBlocks(mut state)) = self.overlay.take() {
                    state.teardown();
                }
            }
        }
    }

    fn open_model_picker(&mut self, workspace: &Workspace) {
        let Some(conversation) = workspace.selected() else {
            self.set_notice("Start a conversation first".to_string());
            return;
        };
        if self.models.is_empty() {
            self.set_notice("No models configured".to_string());
            return;
        }
        self.overlay = Some(Overlay::ModelPicker(ModelPickerState::new(
            self.models.clone(),
            conversation.model.as_deref(),
            conversation.temperature,
        )));
    }

    fn open_code_blocks(&mut self, workspace: &Workspace) {
        let latest_reply = workspace.selected().and_then(|c| {
            c.messages
                .iter()
                .rev()
                .find(|m| m.role == Role::Assistant)
        });
        let Some(reply) = latest_reply else {
            self.set_notice("No reply to copy from".to_string());
            return;
        };
        self.overlay = Some(Overlay::CodeBlocks(CodeBlocksState::new(
            code_blocks(&reply.content),
            Box::new(SystemClipboard),
            self.save_dir.clone(),
        )));
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; unsupported
        // terminals ignore it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

fn save(workspace: &Workspace, config: &ResolvedConfig, tui: &mut TuiState) {
    match workspace.save(&config.workspace_file) {
        Ok(()) => tui.dirty = false,
        Err(e) => {
            warn!(
                "Failed to save workspace to {}: {}",
                config.workspace_file.display(),
                e
            );
            tui.set_notice(format!("Save failed: {e}"));
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut workspace = Workspace::load(
        &config.workspace_file,
        config.default_model.clone(),
        config.default_temperature,
    )?;
    let device = device_for(
        config.speech_command.as_deref(),
        &config.speech_args,
        &config.speech_lang,
    );
    let save_dir = std::env::current_dir()?;
    let mut tui = TuiState::new(
        device,
        config.narrow_width,
        config.composer_max_lines,
        config.models.clone(),
        save_dir,
    );

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Could not enable terminal modes: {}", e))
        .ok();

    let mut needs_redraw = true; // Force first frame

    loop {
        let width = terminal.size()?.width;
        needs_redraw |= tui.sync(&mut workspace, width);
        needs_redraw |= tui.pump(&mut workspace);

        if tui.dirty {
            save(&workspace, &config, &mut tui);
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &workspace, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(tui.poll_timeout());
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain everything pending before the next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if tui.handle_event(&mut workspace, event) == Flow::Quit {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }
    }

    tui.teardown();
    if tui.dirty {
        save(&workspace, &config, &mut tui);
    }

    ratatui::restore();
    info!("Nook shut down");
    Ok(())
}
