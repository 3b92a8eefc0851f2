//! # Model Picker Component
//!
//! Overlay for the selected conversation's model and temperature. Opened
//! with Ctrl+L.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ModelPickerState` lives in the TUI state while the overlay is open
//! - `ModelPicker` is created each frame with borrowed state

use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::core::models::{ModelInfo, bytes_to_gb, step_temperature, temperature_label, time_ago};
use crate::tui::components::{centered_rect, truncate_str};
use crate::tui::event::TuiEvent;

/// Persistent state for the model picker overlay.
pub struct ModelPickerState {
    pub models: Vec<ModelInfo>,
    pub selected: usize,
    pub list_state: ListState,
    pub temperature: f32,
}

impl ModelPickerState {
    /// Start on `current` if it's in the list.
    pub fn new(models: Vec<ModelInfo>, current: Option<&str>, temperature: f32) -> Self {
        let selected = current
            .and_then(|name| models.iter().position(|m| m.name == name))
            .unwrap_or(0);
        let mut list_state = ListState::default();
        if !models.is_empty() {
            list_state.select(Some(selected));
        }
        Self {
            models,
            selected,
            list_state,
            temperature,
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<ModelPickerEvent> {
        match event {
            TuiEvent::Escape => Some(ModelPickerEvent::Dismiss),
            TuiEvent::CursorUp if !self.models.is_empty() => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorDown if !self.models.is_empty() => {
                self.selected = (self.selected + 1).min(self.models.len() - 1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorLeft | TuiEvent::CursorRight => {
                let steps = if matches!(event, TuiEvent::CursorLeft) { -1 } else { 1 };
                let next = step_temperature(self.temperature, steps);
                if next == self.temperature {
                    return None;
                }
                self.temperature = next;
                Some(ModelPickerEvent::Temperature(next))
            }
            TuiEvent::Submit => self
                .models
                .get(self.selected)
                .map(|model| ModelPickerEvent::Select(model.name.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelPickerEvent {
    Select(String),
    Temperature(f32),
    Dismiss,
}

/// Transient render wrapper for the model picker overlay.
pub struct ModelPicker<'a> {
    state: &'a mut ModelPickerState,
    current_model: Option<&'a str>,
}

impl<'a> ModelPicker<'a> {
    pub fn new(state: &'a mut ModelPickerState, current_model: Option<&'a str>) -> Self {
        Self {
            state,
            current_model,
        }
    }

    fn temperature_line(&self) -> Line<'static> {
        const SLOTS: usize = 10;
        let filled = (self.state.temperature * SLOTS as f32).round() as usize;
        let bar: String = (0..SLOTS)
            .map(|i| if i < filled { '█' } else { '░' })
            .collect();
        Line::from(vec![
            Span::styled("Temperature ", Style::default().fg(Color::Gray)),
            Span::styled(bar, Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {:.1} ", self.state.temperature)),
            Span::styled(
                temperature_label(self.state.temperature),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 60, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Model ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Enter Select  ←/→ Temperature  Esc Back ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [list_area, _, temp_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        frame.render_widget(Paragraph::new(self.temperature_line()), temp_area);

        if self.state.models.is_empty() {
            let empty = Paragraph::new(
                "No models configured.\nAdd [[models]] entries to ~/.nook/config.toml",
            )
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
            frame.render_widget(empty, list_area);
            return;
        }

        let now = Utc::now();
        let width = list_area.width as usize;
        let items: Vec<ListItem> = self
            .state
            .models
            .iter()
            .enumerate()
            .map(|(i, model)| {
                let is_active = self.current_model == Some(model.name.as_str());
                let mut details = bytes_to_gb(model.size);
                if let Some(modified) = model.modified_at {
                    details.push_str(" · ");
                    details.push_str(&time_ago(modified, now));
                }
                let marker = if is_active { " *" } else { "" };
                let name_width = width
                    .saturating_sub(details.chars().count() + 2)
                    .saturating_sub(marker.len());
                let name = format!(
                    "{:<w$}{marker}",
                    truncate_str(&model.name, name_width),
                    w = name_width
                );

                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else if is_active {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let detail_style = if i == self.state.selected {
                    style
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(name, style),
                    Span::styled("  ", style),
                    Span::styled(details, detail_style),
                ]))
            })
            .collect();

        frame.render_stateful_widget(List::new(items), list_area, &mut self.state.list_state);
    }
}
