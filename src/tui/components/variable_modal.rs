//! Overlay for filling a prompt's `{{variable}}` placeholders.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::core::variables::VariableForm;
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum VariableModalEvent {
    /// The prompt with every variable substituted
    Submit(String),
    Notice(String),
    Dismiss,
}

pub struct VariableModalState {
    pub form: VariableForm,
}

impl VariableModalState {
    pub fn new(form: VariableForm) -> Self {
        Self { form }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<VariableModalEvent> {
        match event {
            TuiEvent::Escape => Some(VariableModalEvent::Dismiss),
            TuiEvent::FocusNext | TuiEvent::CursorDown => {
                self.form.select_next();
                None
            }
            TuiEvent::CursorUp => {
                self.form.select_prev();
                None
            }
            TuiEvent::InputChar(c) => {
                if let Some(value) = self.form.selected_value_mut() {
                    value.push(*c);
                }
                None
            }
            TuiEvent::Paste(text) => {
                if let Some(value) = self.form.selected_value_mut() {
                    value.push_str(text);
                }
                None
            }
            TuiEvent::Backspace => {
                if let Some(value) = self.form.selected_value_mut() {
                    value.pop();
                }
                None
            }
            TuiEvent::Submit => Some(match self.form.submit() {
                Ok(text) => VariableModalEvent::Submit(text),
                Err(missing) => VariableModalEvent::Notice(missing.to_string()),
            }),
            _ => None,
        }
    }
}

pub struct VariableModal<'a> {
    state: &'a VariableModalState,
}

impl<'a> VariableModal<'a> {
    pub fn new(state: &'a VariableModalState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let form = &self.state.form;
        let overlay = centered_rect(60, 60, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", form.prompt_name))
            .title_bottom(Line::from(" Tab Next field  Enter Submit  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let description_height = if form.description.is_empty() { 0 } else { 2 };
        let [description_area, fields_area] = Layout::vertical([
            Constraint::Length(description_height),
            Constraint::Min(1),
        ])
        .areas(inner);

        if !form.description.is_empty() {
            frame.render_widget(
                Paragraph::new(form.description.as_str())
                    .style(Style::default().fg(Color::DarkGray))
                    .wrap(Wrap { trim: true }),
                description_area,
            );
        }

        let lines: Vec<Line> = form
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let selected = i == form.selected;
                let label_style = if selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let value = if entry.value.is_empty() && !selected {
                    Span::styled(
                        format!("Enter a value for {}...", entry.key),
                        Style::default().fg(Color::DarkGray),
                    )
                } else {
                    Span::raw(entry.value.clone())
                };
                let cursor = if selected { "▏" } else { "" };
                Line::from(vec![
                    Span::styled(format!("{}: ", entry.key), label_style),
                    value,
                    Span::styled(cursor, label_style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), fields_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn modal() -> VariableModalState {
        let form = VariableForm::for_prompt(
            "Translate",
            "Translate some text",
            "Translate {{text}} into {{language}}",
        )
        .unwrap();
        VariableModalState::new(form)
    }

    fn type_str(state: &mut VariableModalState, s: &str) {
        for c in s.chars() {
            state.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_fill_and_submit() {
        let mut state = modal();
        type_str(&mut state, "hola");
        state.handle_event(&TuiEvent::FocusNext);
        type_str(&mut state, "English");
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(VariableModalEvent::Submit("Translate hola into English".to_string()))
        );
    }

    #[test]
    fn test_empty_value_blocks_submit() {
        let mut state = modal();
        type_str(&mut state, "hola");
        assert!(matches!(
            state.handle_event(&TuiEvent::Submit),
            Some(VariableModalEvent::Notice(msg)) if msg.contains("language")
        ));
    }

    #[test]
    fn test_backspace_and_escape() {
        let mut state = modal();
        type_str(&mut state, "ab");
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(state.form.entries[0].value, "a");
        assert_eq!(
            state.handle_event(&TuiEvent::Escape),
            Some(VariableModalEvent::Dismiss)
        );
    }

    #[test]
    fn test_render_lists_fields() {
        let state = modal();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| VariableModal::new(&state).render(f, f.area()))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Translate"));
        assert!(screen.contains("text:"));
        assert!(screen.contains("language:"));
    }
}
