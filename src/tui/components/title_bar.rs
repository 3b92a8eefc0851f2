//! # TitleBar Component
//!
//! Top status bar: the selected conversation, its model and temperature, and
//! transient notices ("Please enter a message", "Copied!", ...).
//!
//! ## Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar {
//!     conversation: "Groceries".to_string(),
//!     model_name: Some("llama3:8b".to_string()),
//!     temperature: 0.7,
//!     status_message: String::new(),
//!     streaming: false,
//! };
//! title_bar.render(frame, area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Streaming**: `"Nook · Groceries (llama3:8b, temp 0.7) | ● responding"`
//! 2. **Status message**: `"Nook · Groceries (llama3:8b, temp 0.7) | Copied!"`
//! 3. **Default**: `"Nook · Groceries (llama3:8b, temp 0.7)"`
//!
//! The streaming marker and the notice never both show; the notice wins.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    /// Name of the selected conversation, empty when none is selected
    pub conversation: String,
    pub model_name: Option<String>,
    pub temperature: f32,
    /// Transient notice, empty when there is nothing to say
    pub status_message: String,
    pub streaming: bool,
}

impl TitleBar {
    pub fn title_text(&self) -> String {
        let mut text = String::from("Nook");
        if !self.conversation.is_empty() {
            text.push_str(" · ");
            text.push_str(&self.conversation);
            let model = self.model_name.as_deref().unwrap_or("no model");
            text.push_str(&format!(" ({}, temp {:.1})", model, self.temperature));
        }
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        } else if self.streaming {
            text.push_str(" | ● responding");
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.status_message.is_empty() {
            Style::default()
        } else {
            Style::default().fg(Color::Yellow)
        };
        frame.render_widget(Line::from(Span::styled(self.title_text(), style)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn bar() -> TitleBar {
        TitleBar {
            conversation: "Groceries".to_string(),
            model_name: Some("llama3:8b".to_string()),
            temperature: 0.7,
            status_message: String::new(),
            streaming: false,
        }
    }

    #[test]
    fn test_default_title() {
        assert_eq!(bar().title_text(), "Nook · Groceries (llama3:8b, temp 0.7)");
    }

    #[test]
    fn test_no_conversation_selected() {
        let mut b = bar();
        b.conversation.clear();
        assert_eq!(b.title_text(), "Nook");
    }

    #[test]
    fn test_notice_beats_streaming_marker() {
        let mut b = bar();
        b.streaming = true;
        assert!(b.title_text().ends_with("| ● responding"));
        b.status_message = "Copied!".to_string();
        assert!(b.title_text().ends_with("| Copied!"));
    }

    #[test]
    fn test_missing_model() {
        let mut b = bar();
        b.model_name = None;
        assert!(b.title_text().contains("(no model, temp 0.7)"));
    }

    #[test]
    fn test_render_into_one_line() {
        let backend = TestBackend::new(60, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| bar().render(f, f.area())).unwrap();
        let line: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(line.starts_with("Nook · Groceries"));
    }
}
