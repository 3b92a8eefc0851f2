//! # Sidebar Component
//!
//! The folder tree for conversations and prompts.
//!
//! ```text
//! ┌ Nook ──────────────────────┐
//! │/ Search                    │
//! │Conversations               │  ◀ drop here to take an item out of its folder
//! │ ▾ Work                     │  ◀ drop target (highlighted while dragged over)
//! │     Budget review          │
//! │ ▸ Personal                 │
//! │   Trip planning            │  unfoldered, newest first
//! │Prompts                     │
//! │ ▸ Writing                  │
//! │   Summarize                │
//! │n folder r rename d delete  │
//! └────────────────────────────┘
//! ```
//!
//! ## Keys (while focused)
//!
//! | Key        | Action                                         |
//! |------------|------------------------------------------------|
//! | ↑ / ↓      | Move the cursor                                |
//! | Enter      | Toggle folder, open conversation, use prompt   |
//! | `/`        | Search (Enter keeps the term, Esc clears it)   |
//! | `n`        | New folder in the cursor's section             |
//! | `r` / `d`  | Arm rename / delete on the folder under cursor |
//! | `C`        | Arm "clear conversations"                      |
//! | `y` / `n`  | Confirm / cancel a pending delete or clear     |
//! | Esc        | Cancel whatever is armed                       |
//!
//! Mouse: click toggles folders and opens items; dragging an item onto a
//! folder moves it there, onto a section header takes it out of its folder.
//!
//! All changes leave as [`Intent`]s; folder-row interaction state lives in
//! the core [`FolderTree`].

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::confirm::Confirmation;
use crate::core::folder::{DropHighlight, FolderTree, SubmitOutcome};
use crate::core::intent::Intent;
use crate::core::placement::{DragPayload, place};
use crate::core::workspace::{DEFAULT_FOLDER_NAME, FolderMember, ItemKind, Workspace};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::truncate_str;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    Intent(Intent),
    /// A prompt was chosen; its content goes to the composer.
    UsePrompt(String),
    Notice(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Section(ItemKind),
    Folder { id: String },
    Item {
        kind: ItemKind,
        id: String,
        nested: bool,
    },
}

impl Row {
    fn kind(&self, workspace: &Workspace) -> ItemKind {
        match self {
            Row::Section(kind) | Row::Item { kind, .. } => *kind,
            Row::Folder { id } => workspace
                .folder(id)
                .map_or(ItemKind::Conversation, |f| f.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DropTarget {
    Folder(String),
    Section(ItemKind),
}

/// A mouse press on an item row, possibly turning into a drag.
#[derive(Debug)]
struct Press {
    kind: ItemKind,
    id: String,
    dragging: bool,
}

#[derive(Default)]
pub struct SidebarState {
    tree: FolderTree,
    searching: bool,
    cursor: usize,
    scroll: usize,
    clear_gate: Confirmation<()>,
    press: Option<Press>,
    hover: Option<DropTarget>,
    /// Where rows were drawn last frame, for hit testing
    list_area: Rect,
    /// Keyboard focus is in the sidebar (Prop)
    pub focused: bool,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        self.tree.search_term()
    }

    pub fn is_dragging(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.dragging)
    }

    /// Whether keystrokes are going into a text field (search or rename).
    pub fn is_editing(&self) -> bool {
        self.searching
            || self
                .tree
                .armed()
                .and_then(|id| self.tree.row(id))
                .is_some_and(|row| row.confirm.is_renaming())
    }

    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    fn set_search_term(&mut self, term: String) {
        self.tree.set_search_term(&term);
        self.cursor = 0;
        self.scroll = 0;
    }

    fn rows(&mut self, workspace: &Workspace) -> Vec<Row> {
        self.tree.sync(workspace.folders.iter());
        let search = self.tree.search_term().to_string();
        let mut rows = Vec::new();
        for kind in [ItemKind::Conversation, ItemKind::Prompt] {
            rows.push(Row::Section(kind));
            for folder in workspace.folders_of(kind) {
                rows.push(Row::Folder {
                    id: folder.id.clone(),
                });
                if !self.tree.is_open(&folder.id) {
                    continue;
                }
                let children: Vec<String> = match kind {
                    ItemKind::Conversation => workspace
                        .conversations_in(&folder.id, &search)
                        .into_iter()
                        .map(|c| c.id.clone())
                        .collect(),
                    ItemKind::Prompt => workspace
                        .prompts_in(&folder.id, &search)
                        .into_iter()
                        .map(|p| p.id.clone())
                        .collect(),
                };
                rows.extend(children.into_iter().map(|id| Row::Item {
                    kind,
                    id,
                    nested: true,
                }));
            }
            let loose: Vec<String> = match kind {
                ItemKind::Conversation => workspace
                    .unfoldered_conversations(&search)
                    .into_iter()
                    .map(|c| c.id.clone())
                    .collect(),
                ItemKind::Prompt => workspace
                    .unfoldered_prompts(&search)
                    .into_iter()
                    .map(|p| p.id.clone())
                    .collect(),
            };
            rows.extend(loose.into_iter().map(|id| Row::Item {
                kind,
                id,
                nested: false,
            }));
        }
        rows
    }

    fn row_at(&self, rows: &[Row], column: u16, row: u16) -> Option<usize> {
        if !self.list_area.contains(Position { x: column, y: row }) {
            return None;
        }
        let index = self.scroll + (row - self.list_area.y) as usize;
        (index < rows.len()).then_some(index)
    }

    fn set_hover(&mut self, target: Option<DropTarget>) {
        if self.hover == target {
            return;
        }
        if let Some(DropTarget::Folder(old)) = self.hover.take() {
            self.tree.row_mut(&old).drag_leave();
        }
        if let Some(DropTarget::Folder(id)) = &target {
            let row = self.tree.row_mut(id);
            if row.drag_over() {
                row.drag_enter();
            }
        }
        self.hover = target;
    }

    fn keep_cursor_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
    }
}

/// Transient wrapper pairing the sidebar state with a workspace snapshot.
pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub workspace: &'a Workspace,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut SidebarState, workspace: &'a Workspace) -> Self {
        Self { state, workspace }
    }

    fn activate(&mut self, row: &Row) -> Option<SidebarEvent> {
        match row {
            Row::Folder { id } => {
                self.state.tree.row_mut(id).toggle();
                None
            }
            Row::Item {
                kind: ItemKind::Conversation,
                id,
                ..
            } => Some(SidebarEvent::Intent(Intent::SelectConversation {
                id: id.clone(),
            })),
            Row::Item {
                kind: ItemKind::Prompt,
                id,
                ..
            } => Some(SidebarEvent::UsePrompt(id.clone())),
            Row::Section(_) => None,
        }
    }

    fn handle_search(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        let mut term = self.state.search_term().to_string();
        match event {
            TuiEvent::InputChar(c) => term.push(*c),
            TuiEvent::Paste(text) => term.push_str(text),
            TuiEvent::Backspace => {
                term.pop();
            }
            TuiEvent::Escape => {
                term.clear();
                self.state.searching = false;
            }
            TuiEvent::Submit => {
                self.state.searching = false;
                return None;
            }
            _ => return None,
        }
        self.state.set_search_term(term);
        None
    }

    fn handle_armed(&mut self, id: &str, event: &TuiEvent) -> Option<SidebarEvent> {
        let workspace = self.workspace;
        let Some(folder) = workspace.folder(id) else {
            self.state.tree.cancel_all();
            return None;
        };
        let row = self.state.tree.row_mut(id);
        if row.confirm.is_renaming() {
            match event {
                TuiEvent::Escape => {
                    row.cancel();
                }
                TuiEvent::InputChar(c) => row.confirm.draft_mut()?.push(*c),
                TuiEvent::Paste(text) => row.confirm.draft_mut()?.push_str(text),
                TuiEvent::Backspace => {
                    row.confirm.draft_mut()?.pop();
                }
                TuiEvent::Submit | TuiEvent::NewLine => {
                    let modifier = matches!(event, TuiEvent::NewLine);
                    return match row.submit_key(folder, modifier) {
                        SubmitOutcome::Committed(intent) => Some(SidebarEvent::Intent(intent)),
                        SubmitOutcome::Rejected(e) => Some(SidebarEvent::Notice(e.to_string())),
                        SubmitOutcome::Ignored => None,
                    };
                }
                _ => {}
            }
            return None;
        }
        match event {
            TuiEvent::Submit | TuiEvent::InputChar('y') => row
                .confirm(folder)
                .ok()
                .flatten()
                .map(SidebarEvent::Intent),
            TuiEvent::Escape | TuiEvent::InputChar('n') => {
                row.cancel();
                None
            }
            _ => None,
        }
    }

    fn handle_clear_gate(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        match event {
            TuiEvent::Submit | TuiEvent::InputChar('y') => self
                .state
                .clear_gate
                .confirm()
                .map(|()| SidebarEvent::Intent(Intent::ClearConversations)),
            TuiEvent::Escape | TuiEvent::InputChar('n') => {
                self.state.clear_gate.cancel();
                None
            }
            _ => None,
        }
    }

    fn handle_browse(&mut self, rows: &[Row], event: &TuiEvent) -> Option<SidebarEvent> {
        let workspace = self.workspace;
        let current = rows.get(self.state.cursor).cloned();
        match event {
            TuiEvent::CursorUp => {
                self.state.cursor = self.state.cursor.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.state.cursor = (self.state.cursor + 1).min(rows.len().saturating_sub(1));
                None
            }
            TuiEvent::Submit => self.activate(&current?),
            TuiEvent::InputChar('/') => {
                self.state.searching = true;
                None
            }
            TuiEvent::InputChar('n') => {
                let kind = current.map_or(ItemKind::Conversation, |r| r.kind(workspace));
                Some(SidebarEvent::Intent(Intent::CreateFolder {
                    kind,
                    name: DEFAULT_FOLDER_NAME.to_string(),
                }))
            }
            TuiEvent::InputChar(key @ ('r' | 'd')) => {
                let Some(Row::Folder { id }) = current else {
                    return None;
                };
                let folder = workspace.folder(&id)?;
                self.state.tree.cancel_all();
                let row = self.state.tree.row_mut(&id);
                if *key == 'r' {
                    row.arm_rename(folder);
                } else {
                    row.arm_delete();
                }
                None
            }
            TuiEvent::InputChar('C') => {
                if workspace.conversations.is_empty() {
                    return None;
                }
                self.state.clear_gate.arm(());
                None
            }
            TuiEvent::Escape => {
                if !self.state.search_term().is_empty() {
                    self.state.set_search_term(String::new());
                }
                None
            }
            _ => None,
        }
    }

    fn mouse_down(&mut self, rows: &[Row], column: u16, row: u16) -> Option<SidebarEvent> {
        let index = self.state.row_at(rows, column, row)?;
        self.state.cursor = index;
        match &rows[index] {
            Row::Folder { id } => {
                self.state.tree.row_mut(id).toggle();
            }
            Row::Item { kind, id, .. } => {
                self.state.press = Some(Press {
                    kind: *kind,
                    id: id.clone(),
                    dragging: false,
                });
            }
            Row::Section(_) => {}
        }
        None
    }

    fn mouse_drag(&mut self, rows: &[Row], column: u16, row: u16) -> Option<SidebarEvent> {
        self.state.press.as_mut()?.dragging = true;
        let target = self
            .state
            .row_at(rows, column, row)
            .and_then(|i| match &rows[i] {
                Row::Folder { id } => Some(DropTarget::Folder(id.clone())),
                Row::Section(kind) => Some(DropTarget::Section(*kind)),
                Row::Item { .. } => None,
            });
        self.state.set_hover(target);
        None
    }

    fn mouse_up(&mut self, rows: &[Row], column: u16, row: u16) -> Option<SidebarEvent> {
        let press = self.state.press.take()?;
        let target = self.state.hover.take();

        if !press.dragging {
            let index = self.state.row_at(rows, column, row)?;
            return match &rows[index] {
                Row::Item { id, .. } if *id == press.id => self.activate(&rows[index]),
                _ => None,
            };
        }

        let payload = DragPayload::for_item(press.kind, &press.id);
        let reassignment = match target {
            Some(DropTarget::Folder(id)) => {
                let folder = self.workspace.folder(&id)?;
                self.state.tree.row_mut(&id).drop(folder, folder.kind, &payload)
            }
            Some(DropTarget::Section(kind)) => match place(&payload, kind, None) {
                Ok(intent) => Some(intent),
                Err(e) => {
                    debug!("Drop on section rejected: {}", e);
                    None
                }
            },
            None => {
                self.state.tree.clear_highlights();
                None
            }
        };
        reassignment.map(|r| SidebarEvent::Intent(Intent::ReassignItem(r)))
    }

    fn row_line(&self, row: &Row, selected: bool, width: usize) -> Line<'static> {
        let workspace = self.workspace;
        let (text, mut style) = match row {
            Row::Section(kind) => {
                let label = match kind {
                    ItemKind::Conversation => "Conversations",
                    ItemKind::Prompt => "Prompts",
                };
                let mut style = Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
                if self.state.hover == Some(DropTarget::Section(*kind)) {
                    style = style.bg(Color::Blue);
                }
                (label.to_string(), style)
            }
            Row::Folder { id } => {
                let name = workspace.folder(id).map_or("", |f| f.name.as_str());
                let state = self.state.tree.row(id);
                let open = self.state.tree.is_open(id);
                let mut style = Style::default();
                if state.is_some_and(|s| s.highlight == DropHighlight::DragOver) {
                    style = style.bg(Color::Blue);
                }
                match state.map(|s| &s.confirm) {
                    Some(c) if c.is_renaming() => (
                        format!(" ✎ {}▏", c.draft().unwrap_or_default()),
                        style.fg(Color::Yellow),
                    ),
                    Some(c) if c.is_deleting() => {
                        (format!(" ✗ Delete {name}? (y/n)"), style.fg(Color::Red))
                    }
                    _ => (format!(" {} {name}", if open { "▾" } else { "▸" }), style),
                }
            }
            Row::Item { kind, id, nested } => {
                let name = match kind {
                    ItemKind::Conversation => workspace
                        .conversations
                        .iter()
                        .find(|c| c.id == *id)
                        .map(|c| c.name()),
                    ItemKind::Prompt => workspace
                        .prompts
                        .iter()
                        .find(|p| p.id == *id)
                        .map(|p| p.name()),
                };
                let indent = if *nested { "     " } else { "   " };
                let mut style = Style::default().fg(Color::Gray);
                if workspace.selected_conversation.as_deref() == Some(id.as_str()) {
                    style = Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD);
                }
                if self.state.press.as_ref().is_some_and(|p| p.dragging && p.id == *id) {
                    style = style.add_modifier(Modifier::DIM);
                }
                (format!("{indent}{}", name.unwrap_or_default()), style)
            }
        };
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Line::from(Span::styled(truncate_str(&text, width), style))
    }

    fn search_line(&self) -> Line<'static> {
        let term = self.state.search_term();
        if self.state.searching {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::Cyan)),
                Span::raw(term.to_string()),
                Span::raw("▏"),
            ])
        } else if term.is_empty() {
            Line::from(Span::styled("/ Search", Style::default().fg(Color::DarkGray)))
        } else {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::DarkGray)),
                Span::styled(term.to_string(), Style::default().fg(Color::Cyan)),
            ])
        }
    }

    fn footer_line(&self) -> Line<'static> {
        if self.state.clear_gate.is_armed() {
            Line::from(Span::styled(
                "Clear all conversations? (y/n)",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                "n folder  r rename  d delete  C clear",
                Style::default().fg(Color::DarkGray),
            ))
        }
    }
}

impl<'a> Component for Sidebar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.state.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(" Nook ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [search_area, list_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner);
        self.state.list_area = list_area;

        let rows = self.state.rows(self.workspace);
        self.state.cursor = self.state.cursor.min(rows.len().saturating_sub(1));
        self.state.keep_cursor_visible(list_area.height as usize);

        let width = list_area.width as usize;
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(self.state.scroll)
            .take(list_area.height as usize)
            .map(|(i, row)| self.row_line(row, self.state.focused && i == self.state.cursor, width))
            .collect();

        frame.render_widget(Paragraph::new(self.search_line()), search_area);
        frame.render_widget(Paragraph::new(lines), list_area);
        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);
    }
}

impl<'a> EventHandler for Sidebar<'a> {
    type Event = SidebarEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let rows = self.state.rows(self.workspace);
        self.state.cursor = self.state.cursor.min(rows.len().saturating_sub(1));

        match event {
            TuiEvent::MouseDown(x, y) => return self.mouse_down(&rows, *x, *y),
            TuiEvent::MouseDrag(x, y) => return self.mouse_drag(&rows, *x, *y),
            TuiEvent::MouseUp(x, y) => return self.mouse_up(&rows, *x, *y),
            _ => {}
        }

        if self.state.searching {
            return self.handle_search(event);
        }
        if let Some(id) = self.state.tree.armed().map(str::to_string) {
            return self.handle_armed(&id, event);
        }
        if self.state.clear_gate.is_armed() {
            return self.handle_clear_gate(event);
        }
        self.handle_browse(&rows, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::placement::ReassignmentIntent;
    use crate::test_support::sample_workspace;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    // With every folder closed the rows are drawn at screen row 2 + index:
    //
    // 0 Conversations   1 Work   2 Personal   3 Trip planning   4 Groceries
    // 5 Prompts         6 Writing             7 Summarize
    const ROW_Y: u16 = 2;

    fn draw(state: &mut SidebarState, workspace: &Workspace) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal
            .draw(|f| Sidebar::new(state, workspace).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn send(state: &mut SidebarState, workspace: &Workspace, event: TuiEvent) -> Option<SidebarEvent> {
        Sidebar::new(state, workspace).handle_event(&event)
    }

    fn type_str(state: &mut SidebarState, workspace: &Workspace, s: &str) {
        for c in s.chars() {
            send(state, workspace, TuiEvent::InputChar(c));
        }
    }

    fn drag(
        state: &mut SidebarState,
        workspace: &Workspace,
        from: usize,
        to: usize,
    ) -> Option<SidebarEvent> {
        let (from, to) = (ROW_Y + from as u16, ROW_Y + to as u16);
        send(state, workspace, TuiEvent::MouseDown(5, from));
        send(state, workspace, TuiEvent::MouseDrag(5, to));
        send(state, workspace, TuiEvent::MouseUp(5, to))
    }

    fn setup() -> (SidebarState, Workspace) {
        let ws = sample_workspace();
        let mut state = SidebarState::new();
        state.focused = true;
        draw(&mut state, &ws);
        (state, ws)
    }

    #[test]
    fn test_lists_folders_then_unfoldered_newest_first() {
        let (mut state, ws) = setup();
        let screen = draw(&mut state, &ws);
        let pos = |s: &str| screen.find(s).unwrap();
        assert!(pos("Work") < pos("Personal"));
        assert!(pos("Personal") < pos("Trip planning"));
        assert!(pos("Trip planning") < pos("Groceries"));
        assert!(!screen.contains("Budget review"), "closed folder hides children");
    }

    #[test]
    fn test_drag_conversation_into_folder() {
        let (mut state, ws) = setup();
        send(&mut state, &ws, TuiEvent::MouseDown(5, ROW_Y + 3));
        send(&mut state, &ws, TuiEvent::MouseDrag(5, ROW_Y + 1));
        assert_eq!(
            state.tree().row("f1").unwrap().highlight,
            DropHighlight::DragOver
        );
        send(&mut state, &ws, TuiEvent::MouseDrag(5, ROW_Y + 2));
        assert_eq!(state.tree().row("f1").unwrap().highlight, DropHighlight::Idle);

        let event = send(&mut state, &ws, TuiEvent::MouseUp(5, ROW_Y + 2));
        assert_eq!(
            event,
            Some(SidebarEvent::Intent(Intent::ReassignItem(ReassignmentIntent {
                kind: ItemKind::Conversation,
                item_id: "c3".to_string(),
                target: Some("f2".to_string()),
            })))
        );
        let row = state.tree().row("f2").unwrap();
        assert_eq!(row.highlight, DropHighlight::Idle);
        assert!(row.is_open(), "drop opens the folder");
    }

    #[test]
    fn test_drop_prompt_on_conversation_folder_is_rejected() {
        let (mut state, ws) = setup();
        assert_eq!(drag(&mut state, &ws, 7, 1), None);
        assert!(state.tree().is_open("f1"));
        assert_eq!(state.tree().row("f1").unwrap().highlight, DropHighlight::Idle);
    }

    #[test]
    fn test_drag_out_of_folder_onto_section_header() {
        let (mut state, ws) = setup();
        // Open Work: rows become 1 Work, 2 Budget review, 3 Personal ...
        send(&mut state, &ws, TuiEvent::MouseDown(5, ROW_Y + 1));
        draw(&mut state, &ws);
        let event = drag(&mut state, &ws, 2, 0);
        assert_eq!(
            event,
            Some(SidebarEvent::Intent(Intent::ReassignItem(ReassignmentIntent {
                kind: ItemKind::Conversation,
                item_id: "c2".to_string(),
                target: None,
            })))
        );
    }

    #[test]
    fn test_click_selects_conversation_and_uses_prompt() {
        let (mut state, ws) = setup();
        send(&mut state, &ws, TuiEvent::MouseDown(5, ROW_Y + 4));
        assert_eq!(
            send(&mut state, &ws, TuiEvent::MouseUp(5, ROW_Y + 4)),
            Some(SidebarEvent::Intent(Intent::SelectConversation {
                id: "c1".to_string()
            }))
        );
        send(&mut state, &ws, TuiEvent::MouseDown(5, ROW_Y + 7));
        assert_eq!(
            send(&mut state, &ws, TuiEvent::MouseUp(5, ROW_Y + 7)),
            Some(SidebarEvent::UsePrompt("p2".to_string()))
        );
    }

    #[test]
    fn test_keyboard_rename() {
        let (mut state, ws) = setup();
        send(&mut state, &ws, TuiEvent::CursorDown);
        send(&mut state, &ws, TuiEvent::InputChar('r'));
        assert!(state.is_editing());
        assert!(draw(&mut state, &ws).contains("✎ Work"));

        for _ in 0..4 {
            send(&mut state, &ws, TuiEvent::Backspace);
        }
        assert!(matches!(
            send(&mut state, &ws, TuiEvent::Submit),
            Some(SidebarEvent::Notice(_))
        ));
        assert!(state.is_editing(), "blank rename stays armed");

        type_str(&mut state, &ws, " Jobs ");
        assert_eq!(send(&mut state, &ws, TuiEvent::NewLine), None);
        assert_eq!(
            send(&mut state, &ws, TuiEvent::Submit),
            Some(SidebarEvent::Intent(Intent::RenameFolder {
                id: "f1".to_string(),
                name: "Jobs".to_string(),
            }))
        );
        assert!(!state.is_editing());
    }

    #[test]
    fn test_keyboard_delete_and_cancel() {
        let (mut state, ws) = setup();
        send(&mut state, &ws, TuiEvent::CursorDown);
        send(&mut state, &ws, TuiEvent::InputChar('d'));
        assert!(draw(&mut state, &ws).contains("Delete Work? (y/n)"));
        assert_eq!(send(&mut state, &ws, TuiEvent::Escape), None);
        assert!(state.tree().armed().is_none());

        send(&mut state, &ws, TuiEvent::InputChar('d'));
        assert_eq!(
            send(&mut state, &ws, TuiEvent::InputChar('y')),
            Some(SidebarEvent::Intent(Intent::DeleteFolder {
                id: "f1".to_string()
            }))
        );
    }

    #[test]
    fn test_search_filters_and_forces_folders_open() {
        let (mut state, ws) = setup();
        send(&mut state, &ws, TuiEvent::InputChar('/'));
        type_str(&mut state, &ws, "budget");
        let screen = draw(&mut state, &ws);
        assert!(screen.contains("Budget review"));
        assert!(!screen.contains("Groceries"));
        assert!(state.tree().is_open("f1"));

        send(&mut state, &ws, TuiEvent::Escape);
        assert_eq!(state.search_term(), "");
        assert!(!state.tree().is_open("f1"), "back to the manual preference");
    }

    #[test]
    fn test_clear_conversations_needs_confirmation() {
        let (mut state, ws) = setup();
        assert_eq!(send(&mut state, &ws, TuiEvent::InputChar('C')), None);
        assert!(draw(&mut state, &ws).contains("Clear all conversations?"));
        assert_eq!(send(&mut state, &ws, TuiEvent::InputChar('n')), None);
        send(&mut state, &ws, TuiEvent::InputChar('C'));
        assert_eq!(
            send(&mut state, &ws, TuiEvent::Submit),
            Some(SidebarEvent::Intent(Intent::ClearConversations))
        );
    }

    #[test]
    fn test_clear_not_offered_without_conversations() {
        let ws = Workspace::default();
        let mut state = SidebarState::new();
        draw(&mut state, &ws);
        send(&mut state, &ws, TuiEvent::InputChar('C'));
        assert!(!draw(&mut state, &ws).contains("Clear all conversations?"));
    }

    #[test]
    fn test_new_folder_in_cursor_section() {
        let (mut state, ws) = setup();
        for _ in 0..6 {
            send(&mut state, &ws, TuiEvent::CursorDown);
        }
        assert_eq!(
            send(&mut state, &ws, TuiEvent::InputChar('n')),
            Some(SidebarEvent::Intent(Intent::CreateFolder {
                kind: ItemKind::Prompt,
                name: DEFAULT_FOLDER_NAME.to_string(),
            }))
        );
    }
}
