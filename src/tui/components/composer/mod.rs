//! # Composer Component
//!
//! Terminal front end of the core [`MessageComposer`]: text editing with a
//! cursor, autosizing, and the dictation and stop-streaming controls.
//!
//! ## Keys
//!
//! - Enter sends; Shift+Enter (or Ctrl+J) inserts a line break
//! - Ctrl+R starts or stops dictation
//! - Ctrl+X stops a streaming response (only offered while streaming)
//!
//! ## State Management
//!
//! The text buffer and speech session live in the core composer. Cursor and
//! scroll position live in `CursorState`. `streaming`, `viewport_width` and
//! `focused` are props refreshed by the event loop every iteration.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::core::composer::{MessageComposer, SubmitAction};
use crate::core::speech::{CaptureDevice, SpeechState, SpeechUpdate};
use crate::core::workspace::ChatMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{
    VERTICAL_OVERHEAD, inner_width, next_char_boundary, next_word_boundary, prev_char_boundary,
    prev_word_boundary, wrap_line_count, wrap_options,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    Send {
        message: ChatMessage,
        release_focus: bool,
    },
    StopStreaming,
    /// Something for the status line.
    Notice(String),
    ContentChanged,
}

pub struct Composer {
    pub inner: MessageComposer,
    cursor: CursorState,
    /// A response is streaming (Prop)
    pub streaming: bool,
    /// Terminal width, for the narrow-viewport rule (Prop)
    pub viewport_width: u16,
    /// Keyboard focus is in the composer (Prop)
    pub focused: bool,
}

impl Composer {
    pub fn new(device: Box<dyn CaptureDevice>, narrow_width: u16, max_lines: u16) -> Self {
        Self {
            inner: MessageComposer::new(device, narrow_width, max_lines),
            cursor: CursorState::new(),
            streaming: false,
            viewport_width: 0,
            focused: true,
        }
    }

    pub fn text(&self) -> &str {
        self.inner.text()
    }

    /// Replace the buffer, e.g. with a filled-in prompt.
    pub fn set_text(&mut self, text: String) {
        self.inner.set_text(text);
        self.cursor.move_to_end(self.inner.text());
    }

    /// Box height for the current buffer, borders included.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let lines = wrap_line_count(self.inner.text(), inner_width(area_width));
        self.inner.autosize(lines).lines + VERTICAL_OVERHEAD
    }

    /// Drain dictation results. Call once per event-loop iteration.
    pub fn pump(&mut self) -> Vec<ComposerEvent> {
        self.inner
            .pump_speech()
            .into_iter()
            .filter_map(|update| self.on_speech_update(update))
            .collect()
    }

    fn on_speech_update(&mut self, update: SpeechUpdate) -> Option<ComposerEvent> {
        match update {
            SpeechUpdate::Transcript(_) => {
                self.cursor.move_to_end(self.inner.text());
                Some(ComposerEvent::ContentChanged)
            }
            SpeechUpdate::Failed(e) => Some(ComposerEvent::Notice(e.to_string())),
            SpeechUpdate::Listening | SpeechUpdate::Stopped => Some(ComposerEvent::ContentChanged),
        }
    }

    pub fn teardown(&mut self) {
        self.inner.teardown();
    }

    fn insert(&mut self, text: &str) -> Option<ComposerEvent> {
        let pos = self.cursor.pos;
        self.inner.text_mut().insert_str(pos, text);
        self.cursor.pos += text.len();
        Some(ComposerEvent::ContentChanged)
    }

    fn move_to(&mut self, pos: usize) -> Option<ComposerEvent> {
        (pos != self.cursor.pos).then(|| {
            self.cursor.pos = pos;
            ComposerEvent::ContentChanged
        })
    }

    fn visible_text(&self, area_width: u16) -> String {
        let text = self.inner.text();
        if self.cursor.scroll_offset == 0 {
            return text.to_string();
        }
        let width = inner_width(area_width);
        if width == 0 {
            return String::new();
        }
        let lines = textwrap::wrap(text, wrap_options(width));
        let start = (self.cursor.scroll_offset as usize).min(lines.len());
        let end = (start + self.inner.max_lines() as usize).min(lines.len());
        lines[start..end].join("\n")
    }

    fn title(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(" Message ")];
        match self.inner.speech_state() {
            SpeechState::Listening => spans.push(Span::styled(
                "● listening ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            SpeechState::RequestingPermission => spans.push(Span::styled(
                "○ starting microphone ",
                Style::default().fg(Color::Yellow),
            )),
            SpeechState::Idle => {}
        }
        Line::from(spans)
    }

    fn hints(&self) -> Line<'static> {
        let text = if self.inner.show_stop_button(self.streaming) {
            " Ctrl+X Stop "
        } else if self.inner.is_dictating() {
            " Ctrl+R Stop dictation "
        } else {
            " Enter Send  Shift+Enter Newline  Ctrl+R Dictate "
        };
        Line::from(text).right_aligned()
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let total = wrap_line_count(self.inner.text(), inner_width(area.width));
        if !self.inner.autosize(total).overflow {
            return;
        }
        let max_scroll = total.saturating_sub(self.inner.max_lines());
        let mut state = ScrollbarState::default()
            .content_length(max_scroll as usize)
            .position(self.cursor.scroll_offset as usize);
        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_width = area.width;
        self.cursor
            .update_scroll_offset(self.inner.text(), area.width, self.inner.max_lines());

        let border_style = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title())
            .title_bottom(self.hints());

        let paragraph = Paragraph::new(self.visible_text(area.width)).block(block);
        frame.render_widget(paragraph, area);
        self.render_scrollbar(frame, area);

        if self.focused {
            frame.set_cursor_position(self.cursor.screen_pos(self.inner.text(), area));
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let text = self.inner.text();
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(pasted) => self.insert(pasted),
            TuiEvent::Backspace => {
                if self.cursor.pos == 0 {
                    return None;
                }
                let prev = prev_char_boundary(text, self.cursor.pos);
                let end = self.cursor.pos;
                self.inner.text_mut().drain(prev..end);
                self.cursor.pos = prev;
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor.pos >= text.len() {
                    return None;
                }
                let next = next_char_boundary(text, self.cursor.pos);
                let start = self.cursor.pos;
                self.inner.text_mut().drain(start..next);
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                let pos = prev_char_boundary(text, self.cursor.pos);
                self.move_to(pos)
            }
            TuiEvent::CursorRight => {
                let pos = next_char_boundary(text, self.cursor.pos);
                self.move_to(pos)
            }
            TuiEvent::WordLeft => {
                let pos = prev_word_boundary(text, self.cursor.pos);
                self.move_to(pos)
            }
            TuiEvent::WordRight => {
                let pos = next_word_boundary(text, self.cursor.pos);
                self.move_to(pos)
            }
            TuiEvent::CursorHome => {
                let line_start = text[..self.cursor.pos].rfind('\n').map_or(0, |i| i + 1);
                self.move_to(line_start)
            }
            TuiEvent::CursorEnd => {
                let line_end = text[self.cursor.pos..]
                    .find('\n')
                    .map_or(text.len(), |i| self.cursor.pos + i);
                self.move_to(line_end)
            }
            TuiEvent::CursorUp => {
                let width = self.cursor.last_width;
                let text = self.inner.text().to_string();
                self.cursor
                    .move_vertically(&text, -1, width)
                    .then_some(ComposerEvent::ContentChanged)
            }
            TuiEvent::CursorDown => {
                let width = self.cursor.last_width;
                let text = self.inner.text().to_string();
                self.cursor
                    .move_vertically(&text, 1, width)
                    .then_some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Submit | TuiEvent::NewLine => {
                let modifier = matches!(event, TuiEvent::NewLine);
                match self
                    .inner
                    .submit_key(modifier, self.streaming, self.viewport_width)
                {
                    SubmitAction::InsertLineBreak => self.insert("\n"),
                    SubmitAction::Sent(outcome) => {
                        self.cursor.reset();
                        Some(ComposerEvent::Send {
                            message: outcome.message,
                            release_focus: outcome.release_focus,
                        })
                    }
                    SubmitAction::Refused(e) if e.is_user_visible() => {
                        Some(ComposerEvent::Notice(e.to_string()))
                    }
                    SubmitAction::Refused(_) => None,
                }
            }
            TuiEvent::ToggleDictation => self
                .inner
                .toggle_dictation()
                .and_then(|update| self.on_speech_update(update)),
            TuiEvent::StopStreaming => self
                .inner
                .stop_streaming(self.streaming)
                .map(|_| ComposerEvent::StopStreaming),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::speech::CaptureSignal;
    use crate::test_support::{FakeCapture, FakeCaptureLog, no_capture};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn composer() -> Composer {
        let mut c = Composer::new(no_capture(), 60, 3);
        c.viewport_width = 120;
        c
    }

    fn dictating_composer() -> (Composer, FakeCaptureLog) {
        let (device, log) = FakeCapture::new(true, true);
        let mut c = Composer::new(Box::new(device), 60, 3);
        c.viewport_width = 120;
        (c, log)
    }

    fn type_str(c: &mut Composer, s: &str) {
        for ch in s.chars() {
            c.handle_event(&TuiEvent::InputChar(ch));
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_editing() {
        let mut c = composer();
        type_str(&mut c, "héllo");
        assert_eq!(c.text(), "héllo");
        c.handle_event(&TuiEvent::Backspace);
        c.handle_event(&TuiEvent::CursorHome);
        c.handle_event(&TuiEvent::Delete);
        assert_eq!(c.text(), "éll");
        assert_eq!(c.handle_event(&TuiEvent::CursorLeft), None, "already at start");
    }

    #[test]
    fn test_enter_sends_and_clears() {
        let mut c = composer();
        type_str(&mut c, "hi there");
        let event = c.handle_event(&TuiEvent::Submit);
        assert_eq!(
            event,
            Some(ComposerEvent::Send {
                message: ChatMessage::user("hi there".to_string()),
                release_focus: false,
            })
        );
        assert!(c.text().is_empty());
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut c = composer();
        type_str(&mut c, "a");
        assert_eq!(c.handle_event(&TuiEvent::NewLine), Some(ComposerEvent::ContentChanged));
        type_str(&mut c, "b");
        assert_eq!(c.text(), "a\nb");
    }

    #[test]
    fn test_empty_send_shows_notice() {
        let mut c = composer();
        type_str(&mut c, "   ");
        assert!(matches!(
            c.handle_event(&TuiEvent::Submit),
            Some(ComposerEvent::Notice(_))
        ));
        assert_eq!(c.text(), "   ");
    }

    #[test]
    fn test_send_while_streaming_is_silent() {
        let mut c = composer();
        c.streaming = true;
        type_str(&mut c, "queued");
        assert_eq!(c.handle_event(&TuiEvent::Submit), None);
        assert_eq!(c.text(), "queued");
    }

    #[test]
    fn test_narrow_viewport_releases_focus() {
        let mut c = composer();
        c.viewport_width = 40;
        type_str(&mut c, "x");
        assert!(matches!(
            c.handle_event(&TuiEvent::Submit),
            Some(ComposerEvent::Send {
                release_focus: true,
                ..
            })
        ));
    }

    #[test]
    fn test_stop_streaming_only_while_streaming() {
        let mut c = composer();
        assert_eq!(c.handle_event(&TuiEvent::StopStreaming), None);
        c.streaming = true;
        assert_eq!(
            c.handle_event(&TuiEvent::StopStreaming),
            Some(ComposerEvent::StopStreaming)
        );
    }

    #[test]
    fn test_dictation_unavailable_is_a_notice() {
        let mut c = composer();
        assert!(matches!(
            c.handle_event(&TuiEvent::ToggleDictation),
            Some(ComposerEvent::Notice(_))
        ));
    }

    #[test]
    fn test_transcript_lands_after_existing_text() {
        let (mut c, log) = dictating_composer();
        type_str(&mut c, "Hello");
        c.handle_event(&TuiEvent::ToggleDictation);
        c.pump();
        log.emit(CaptureSignal::Transcript("world".to_string()));
        c.pump();
        assert_eq!(c.text(), "Hello world");
        type_str(&mut c, "!");
        assert_eq!(c.text(), "Hello world!", "cursor moved to the end");
    }

    #[test]
    fn test_height_grows_then_caps() {
        let mut c = composer();
        assert_eq!(c.calculate_height(40), 3);
        c.set_text("1\n2".to_string());
        assert_eq!(c.calculate_height(40), 4);
        c.set_text("1\n2\n3\n4\n5\n6".to_string());
        assert_eq!(c.calculate_height(40), 5);
    }

    #[test]
    fn test_render_shows_listening_indicator() {
        let (mut c, _log) = dictating_composer();
        c.handle_event(&TuiEvent::ToggleDictation);
        c.pump();
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| c.render(f, f.area())).unwrap();
        assert!(screen_text(&terminal).contains("listening"));
    }

    #[test]
    fn test_render_offers_stop_only_while_streaming() {
        let mut c = composer();
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| c.render(f, f.area())).unwrap();
        assert!(!screen_text(&terminal).contains("Ctrl+X"));

        c.streaming = true;
        terminal.draw(|f| c.render(f, f.area())).unwrap();
        assert!(screen_text(&terminal).contains("Ctrl+X Stop"));
    }
}
