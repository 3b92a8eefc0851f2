//! Translation of crossterm input into [`TuiEvent`]s.
//!
//! | Key                          | Event               |
//! |------------------------------|---------------------|
//! | Enter                        | `Submit`            |
//! | Shift+Enter, Alt+Enter, Ctrl+J | `NewLine`         |
//! | Esc                          | `Escape`            |
//! | Tab / Shift+Tab              | `FocusNext`         |
//! | Ctrl+C                       | `ForceQuit`         |
//! | Ctrl+N                       | `NewConversation`   |
//! | Ctrl+R                       | `ToggleDictation`   |
//! | Ctrl+X                       | `StopStreaming`     |
//! | Ctrl+L                       | `OpenModelPicker`   |
//! | Ctrl+Y                       | `OpenCodeBlocks`    |
//! | Ctrl+End                     | `JumpToBottom`      |
//!
//! Mouse presses, drags and releases become `MouseDown`/`MouseDrag`/`MouseUp`
//! and drive folder drag-and-drop in the sidebar.

use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    ForceQuit,
    Escape,
    Submit,
    /// Submit key with the line-break modifier.
    NewLine,
    FocusNext,
    Resize,

    InputChar(char),
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    WordLeft,
    WordRight,

    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    JumpToBottom,

    NewConversation,
    ToggleDictation,
    StopStreaming,
    OpenModelPicker,
    OpenCodeBlocks,

    MouseDown(u16, u16),
    MouseDrag(u16, u16),
    MouseUp(u16, u16),
}

/// Poll for an event without blocking.
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Wait up to `timeout` for the next translated event.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Failed to poll terminal events: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(ev) => translate(ev),
        Err(e) => {
            warn!("Failed to read terminal event: {}", e);
            None
        }
    }
}

pub fn translate(ev: Event) -> Option<TuiEvent> {
    match ev {
        Event::Key(key) => translate_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                Some(TuiEvent::MouseDown(mouse.column, mouse.row))
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(TuiEvent::MouseDrag(mouse.column, mouse.row))
            }
            MouseEventKind::Up(MouseButton::Left) => Some(TuiEvent::MouseUp(mouse.column, mouse.row)),
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<TuiEvent> {
    // Keyboard enhancement reports releases too
    if key.kind == KeyEventKind::Release {
        return None;
    }
    debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c') if ctrl => Some(TuiEvent::ForceQuit),
        KeyCode::Char('j') if ctrl => Some(TuiEvent::NewLine),
        KeyCode::Char('n') if ctrl => Some(TuiEvent::NewConversation),
        KeyCode::Char('r') if ctrl => Some(TuiEvent::ToggleDictation),
        KeyCode::Char('x') if ctrl => Some(TuiEvent::StopStreaming),
        KeyCode::Char('l') if ctrl => Some(TuiEvent::OpenModelPicker),
        KeyCode::Char('y') if ctrl => Some(TuiEvent::OpenCodeBlocks),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter if shift || alt => Some(TuiEvent::NewLine),
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Tab | KeyCode::BackTab => Some(TuiEvent::FocusNext),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left if ctrl || alt => Some(TuiEvent::WordLeft),
        KeyCode::Right if ctrl || alt => Some(TuiEvent::WordRight),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End if ctrl => Some(TuiEvent::JumpToBottom),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
