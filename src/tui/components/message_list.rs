//! # MessageList Component
//!
//! Scrollable view of the selected conversation.
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) plus the messages to show.
//! Scroll policy lives in the core [`ScrollController`]; this component only
//! measures, mirrors the offset into `tui-scrollview`, and draws the
//! "jump to bottom" affordance when the controller asks for it.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::scroll::ScrollController;
use crate::core::workspace::ChatMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

const JUMP_LABEL: &str = " ↓ Jump to bottom (Ctrl+End) ";

/// Must be persisted in the parent TUI state.
pub struct MessageListState {
    pub scroll: ScrollController,
    scroll_view: ScrollViewState,
    layout: LayoutCache,
    /// Screen rect of the jump affordance from the last frame
    jump_button: Option<Rect>,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll: ScrollController::new(),
            scroll_view: ScrollViewState::default(),
            layout: LayoutCache::default(),
            jump_button: None,
        }
    }

    /// Forget cached heights and re-pin, e.g. after switching conversations.
    pub fn reset(&mut self) {
        self.layout = LayoutCache::default();
        self.scroll.jump_to_bottom();
    }

    /// Whether a click at (column, row) landed on the jump affordance.
    pub fn hit_jump_button(&self, column: u16, row: u16) -> bool {
        self.jump_button
            .is_some_and(|r| r.contains(Position { x: column, y: row }))
    }
}

/// Scrollable conversation view. Created fresh each frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [ChatMessage],
    /// The last message may still grow
    pub streaming: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, messages: &'a [ChatMessage], streaming: bool) -> Self {
        Self {
            state,
            messages,
            streaming,
        }
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let hint = Paragraph::new("No messages yet. Type below and press Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        let y = area.y + area.height / 2;
        frame.render_widget(hint, Rect::new(area.x, y, area.width, 1.min(area.height)));
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.jump_button = None;
        if self.messages.is_empty() {
            self.state.scroll.set_extent(0, area.height);
            self.render_empty(frame, area);
            return;
        }

        // -1 for the scrollbar
        let content_width = area.width.saturating_sub(1);
        let layout = &mut self.state.layout;
        layout.measure(self.messages, content_width, self.streaming);
        let total_height = layout.total();

        self.state.scroll.set_extent(total_height, area.height);
        let offset = self.state.scroll.offset();
        self.state.scroll_view.set_offset(Position { x: 0, y: offset });

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let range = self.state.layout.visible_range(offset, area.height);
        let last = self.messages.len() - 1;
        for i in range {
            let top = self.state.layout.top_of(i);
            let rect = Rect::new(0, top, content_width, self.state.layout.heights[i]);
            scroll_view.render_widget(Message::new(&self.messages[i], i == last), rect);
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_view);

        if self.state.scroll.show_jump_button() && area.height > 0 {
            let width = (JUMP_LABEL.chars().count() as u16).min(area.width);
            let rect = Rect::new(
                area.x + area.width.saturating_sub(width + 1),
                area.y + area.height - 1,
                width,
                1,
            );
            let button = Paragraph::new(JUMP_LABEL).style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
            frame.render_widget(button, rect);
            self.state.jump_button = Some(rect);
        }
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => self.scroll.scroll_up(1),
            TuiEvent::ScrollDown => self.scroll.scroll_down(1),
            TuiEvent::ScrollPageUp => self.scroll.page_up(),
            TuiEvent::ScrollPageDown => self.scroll.page_down(),
            TuiEvent::JumpToBottom => self.scroll.jump_to_bottom(),
            TuiEvent::MouseDown(column, row) if self.hit_jump_button(*column, *row) => {
                self.scroll.jump_to_bottom()
            }
            _ => {}
        }
        None
    }
}

/// Cached message heights for one conversation at one width.
#[derive(Default)]
struct LayoutCache {
    heights: Vec<u16>,
    prefix_heights: Vec<u16>,
    content_width: u16,
}

impl LayoutCache {
    /// Heights that can be kept for `messages`. A shrinking list means a
    /// different conversation; while streaming the last message may grow.
    fn reusable_count(&self, messages: &[ChatMessage], content_width: u16, streaming: bool) -> usize {
        if self.content_width != content_width || messages.len() < self.heights.len() {
            return 0;
        }
        if streaming {
            self.heights.len().min(messages.len().saturating_sub(1))
        } else {
            self.heights.len()
        }
    }

    fn measure(&mut self, messages: &[ChatMessage], content_width: u16, streaming: bool) {
        let reusable = self.reusable_count(messages, content_width, streaming);
        self.heights.truncate(reusable);
        for message in &messages[reusable..] {
            self.heights.push(Message::calculate_height(message, content_width));
        }
        self.content_width = content_width;
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    fn total(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    fn top_of(&self, index: usize) -> u16 {
        index
            .checked_sub(1)
            .map_or(0, |prev| self.prefix_heights[prev])
    }

    /// Messages overlapping the viewport, with half a viewport of slack.
    fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> Range<usize> {
        let slack = viewport_height / 2;
        let from = scroll_offset.saturating_sub(slack);
        let to = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(slack);
        let start = self.prefix_heights.partition_point(|&end| end <= from);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < to)
            .saturating_add(1)
            .min(self.prefix_heights.len());
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn messages(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| ChatMessage::user(format!("message {i}")))
            .collect()
    }

    fn draw(state: &mut MessageListState, msgs: &[ChatMessage], height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, height)).unwrap();
        terminal
            .draw(|f| MessageList::new(state, msgs, false).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reuse() {
        let msgs = messages(3);
        let mut cache = LayoutCache::default();
        cache.measure(&msgs, 40, false);
        assert_eq!(cache.heights, vec![3, 3, 3]);
        assert_eq!(cache.total(), 9);
        assert_eq!(cache.top_of(2), 6);

        assert_eq!(cache.reusable_count(&messages(4), 40, false), 3);
        assert_eq!(cache.reusable_count(&messages(4), 40, true), 3);
        assert_eq!(cache.reusable_count(&msgs, 40, true), 2, "last may grow");
        assert_eq!(cache.reusable_count(&msgs, 30, false), 0);
        assert_eq!(cache.reusable_count(&messages(1), 40, false), 0);
    }

    #[test]
    fn test_visible_range() {
        let mut cache = LayoutCache::default();
        cache.measure(&messages(10), 40, false);
        // Offset 15, viewport 6 with slack 3: lines 12..24 are messages 4..=7
        assert_eq!(cache.visible_range(15, 6), 4..8);
    }

    #[test]
    fn test_pinned_list_shows_newest_message() {
        let mut state = MessageListState::new();
        let screen = draw(&mut state, &messages(10), 6);
        assert!(screen.contains("message 9"));
        assert!(!screen.contains("Jump to bottom"));
    }

    #[test]
    fn test_scrolled_up_offers_jump() {
        let mut state = MessageListState::new();
        let msgs = messages(10);
        draw(&mut state, &msgs, 6);
        state.handle_event(&TuiEvent::ScrollPageUp);
        let screen = draw(&mut state, &msgs, 6);
        assert!(screen.contains("Jump to bottom"));
        assert!(!state.scroll.is_pinned());

        let rect = state.jump_button.unwrap();
        state.handle_event(&TuiEvent::MouseDown(rect.x, rect.y));
        assert!(state.scroll.is_pinned());
        let screen = draw(&mut state, &msgs, 6);
        assert!(screen.contains("message 9"));
    }

    #[test]
    fn test_empty_conversation_hint() {
        let mut state = MessageListState::new();
        assert!(draw(&mut state, &[], 5).contains("No messages yet"));
    }
}
