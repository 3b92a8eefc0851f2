//! # Code Blocks Overlay
//!
//! Lists the fenced code blocks of the latest assistant reply (Ctrl+Y).
//! Enter copies the selected block, `s` saves it under a suggested name
//! that can be edited before confirming.
//!
//! The "Copied!" indicator belongs to this overlay's state, so closing the
//! overlay drops the [`CopyFeedback`] and cancels its reset timer.

use std::path::PathBuf;

use log::warn;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::core::clipboard::{
    Clipboard, CodeBlock, CopyFeedback, save_code_block, suggested_file_name,
};
use crate::tui::components::{centered_rect, truncate_str};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum CodeBlocksEvent {
    Notice(String),
    Dismiss,
}

pub struct CodeBlocksState {
    pub blocks: Vec<CodeBlock>,
    pub selected: usize,
    list_state: ListState,
    feedback: CopyFeedback,
    clipboard: Box<dyn Clipboard>,
    save_dir: PathBuf,
    /// File name being edited before a save
    save_name: Option<String>,
}

impl CodeBlocksState {
    pub fn new(blocks: Vec<CodeBlock>, clipboard: Box<dyn Clipboard>, save_dir: PathBuf) -> Self {
        let mut list_state = ListState::default();
        if !blocks.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            blocks,
            selected: 0,
            list_state,
            feedback: CopyFeedback::default(),
            clipboard,
            save_dir,
            save_name: None,
        }
    }

    pub fn is_copied(&self) -> bool {
        self.feedback.is_copied()
    }

    pub fn save_name(&self) -> Option<&str> {
        self.save_name.as_deref()
    }

    /// Apply an expired copy indicator. Returns true if a redraw is needed.
    pub fn pump(&mut self) -> bool {
        self.feedback.pump()
    }

    pub fn teardown(&mut self) {
        self.feedback.teardown();
    }

    fn copy_selected(&mut self) -> Option<CodeBlocksEvent> {
        let block = self.blocks.get(self.selected)?;
        match self.feedback.copy(self.clipboard.as_mut(), &block.value) {
            Ok(()) => None,
            Err(e) => {
                warn!("Copy failed: {}", e);
                Some(CodeBlocksEvent::Notice(e.to_string()))
            }
        }
    }

    fn save_selected(&mut self, name: &str) -> Option<CodeBlocksEvent> {
        let block = self.blocks.get(self.selected)?;
        match save_code_block(&self.save_dir, name, block) {
            Ok(Some(path)) => Some(CodeBlocksEvent::Notice(format!("Saved {}", path.display()))),
            Ok(None) => None,
            Err(e) => {
                warn!("Saving code block failed: {}", e);
                Some(CodeBlocksEvent::Notice(format!("Save failed: {e}")))
            }
        }
    }

    fn handle_save_prompt(&mut self, event: &TuiEvent) -> Option<CodeBlocksEvent> {
        let name = self.save_name.as_mut()?;
        match event {
            TuiEvent::Escape => {
                self.save_name = None;
                None
            }
            TuiEvent::InputChar(c) => {
                name.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                name.push_str(text);
                None
            }
            TuiEvent::Backspace => {
                name.pop();
                None
            }
            TuiEvent::Submit => {
                let name = self.save_name.take().unwrap_or_default();
                self.save_selected(&name)
            }
            _ => None,
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<CodeBlocksEvent> {
        if self.save_name.is_some() {
            return self.handle_save_prompt(event);
        }
        match event {
            TuiEvent::Escape => Some(CodeBlocksEvent::Dismiss),
            TuiEvent::CursorUp if !self.blocks.is_empty() => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorDown if !self.blocks.is_empty() => {
                self.selected = (self.selected + 1).min(self.blocks.len() - 1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::Submit | TuiEvent::InputChar('c') => self.copy_selected(),
            TuiEvent::InputChar('s') => {
                if let Some(block) = self.blocks.get(self.selected) {
                    self.save_name = Some(suggested_file_name(&block.language));
                }
                None
            }
            _ => None,
        }
    }
}

pub struct CodeBlocks<'a> {
    state: &'a mut CodeBlocksState,
}

impl<'a> CodeBlocks<'a> {
    pub fn new(state: &'a mut CodeBlocksState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 60, area);
        frame.render_widget(Clear, overlay);

        let mut title = vec![Span::raw(" Code blocks ")];
        if self.state.is_copied() {
            title.push(Span::styled(
                "Copied! ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Line::from(title))
            .title_bottom(Line::from(" Enter Copy  s Save  Esc Back ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [list_area, prompt_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        if self.state.blocks.is_empty() {
            frame.render_widget(
                Paragraph::new("The latest reply has no code blocks.")
                    .style(Style::default().fg(Color::DarkGray)),
                list_area,
            );
            return;
        }

        let width = list_area.width as usize;
        let items: Vec<ListItem> = self
            .state
            .blocks
            .iter()
            .enumerate()
            .map(|(i, block)| {
                let language = if block.language.is_empty() {
                    "text"
                } else {
                    block.language.as_str()
                };
                let first_line = block.value.lines().next().unwrap_or("");
                let label = format!("[{language}] ");
                let preview = truncate_str(first_line, width.saturating_sub(label.chars().count()));
                let style = if i == self.state.selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(label, style.fg(Color::Yellow)),
                    Span::styled(preview, style),
                ]))
            })
            .collect();
        frame.render_stateful_widget(List::new(items), list_area, &mut self.state.list_state);

        if let Some(name) = self.state.save_name() {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Save as: ", Style::default().fg(Color::Cyan)),
                    Span::raw(name.to_string()),
                    Span::raw("▏"),
                ])),
                prompt_area,
            );
        }
    }
}
