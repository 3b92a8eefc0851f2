//! # TUI Components
//!
//! Everything drawn on screen, one file per component.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Receive all data as struct fields and hold nothing between frames:
//! - `TitleBar`: conversation, model, temperature and notices
//! - `Message`: one chat message
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own or borrow persistent state and emit their own events:
//! - `Composer`: message input, dictation and the stop control
//! - `Sidebar`: folders, conversations and prompts, with drag-and-drop
//! - `MessageList`: scrollable conversation view
//!
//! ### Overlays
//!
//! Persistent `*State` plus a transient render wrapper built each frame:
//! - `ModelPicker`: model and temperature
//! - `VariableModal`: prompt variables
//! - `CodeBlocks`: copy/save code from the latest reply
//!
//! ## Props-Based Data Flow
//!
//! Components never reach into the workspace. The event loop hands them a
//! snapshot, and anything they want changed comes back as an event or an
//! [`Intent`](crate::core::intent::Intent).
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── sidebar.rs
//! ├── model_picker.rs
//! ├── variable_modal.rs
//! ├── code_blocks.rs
//! └── composer/
//! ```

use ratatui::layout::{Constraint, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

mod title_bar;
pub use title_bar::TitleBar;

pub mod code_blocks;
pub mod composer;
pub mod message;
pub mod message_list;
pub mod model_picker;
pub mod sidebar;
pub mod variable_modal;

pub use code_blocks::{CodeBlocks, CodeBlocksEvent, CodeBlocksState};
pub use composer::{Composer, ComposerEvent};
pub use message_list::{MessageList, MessageListState};
pub use model_picker::{ModelPicker, ModelPickerEvent, ModelPickerState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use variable_modal::{VariableModal, VariableModalEvent, VariableModalState};

/// Truncate to `max_width` display columns, ending in "..." when shortened.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let budget = max_width - 3;
    let mut used = 0;
    let kept: String = s
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    format!("{kept}...")
}

/// A rect centered in `outer`, sized as a percentage of it.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("Budget review", 8), "Budge...");
        assert_eq!(truncate_str("ünïcödé", 5), "ün...");
        assert_eq!(truncate_str("abcdef", 2), "..");
        // Wide characters take two columns
        assert_eq!(truncate_str("日本語のメモ", 7), "日本...");
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 15);
    }
}
