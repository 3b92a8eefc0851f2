use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::models::resolve_model;
use crate::core::workspace::Workspace;
use crate::tui::component::Component;
use crate::tui::components::{
    CodeBlocks, MessageList, ModelPicker, Sidebar, TitleBar, VariableModal,
};
use crate::tui::{Focus, Overlay, TuiState};

const SIDEBAR_WIDTH: u16 = 32;

/// Where each region was drawn. Kept on [`TuiState`] for mouse routing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub sidebar: Option<Rect>,
    pub title: Rect,
    pub messages: Rect,
    pub composer: Rect,
}

impl AppLayout {
    pub fn in_sidebar(&self, column: u16, row: u16) -> bool {
        self.sidebar.is_some_and(|r| contains(r, column, row))
    }

    pub fn in_messages(&self, column: u16, row: u16) -> bool {
        contains(self.messages, column, row)
    }

    pub fn in_composer(&self, column: u16, row: u16) -> bool {
        contains(self.composer, column, row)
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Split the screen.
///
/// Wide terminals show the sidebar next to the conversation. Narrow ones
/// show the sidebar full-width while it has focus and hide it otherwise.
pub fn compute_layout(
    area: Rect,
    narrow: bool,
    sidebar_focused: bool,
    composer_height: impl Fn(u16) -> u16,
) -> AppLayout {
    let (sidebar, main) = if narrow {
        if sidebar_focused {
            return AppLayout {
                sidebar: Some(area),
                ..Default::default()
            };
        }
        (None, area)
    } else {
        let width = SIDEBAR_WIDTH.min(area.width / 3);
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(width), Constraint::Min(0)]).areas(area);
        (Some(sidebar), main)
    };

    let input_height = composer_height(main.width).min(main.height.saturating_sub(2));
    let [title, messages, composer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height),
    ])
    .areas(main);

    AppLayout {
        sidebar,
        title,
        messages,
        composer,
    }
}

pub fn draw_ui(frame: &mut Frame, workspace: &Workspace, tui: &mut TuiState) {
    let area = frame.area();
    let narrow = tui.composer.inner.is_narrow(area.width);
    let composer = &tui.composer;
    let layout = compute_layout(area, narrow, tui.focus == Focus::Sidebar, |width| {
        composer.calculate_height(width)
    });
    tui.layout = layout;

    if let Some(sidebar_area) = layout.sidebar {
        Sidebar::new(&mut tui.sidebar, workspace).render(frame, sidebar_area);
    }

    if layout.messages.height > 0 {
        let selected = workspace.selected();
        let (model, _) = resolve_model(&tui.models, selected);
        let mut title_bar = TitleBar {
            conversation: selected.map(|c| c.name.clone()).unwrap_or_default(),
            model_name: model
                .map(|m| m.name.clone())
                .or_else(|| selected.and_then(|c| c.model.clone())),
            temperature: selected.map_or(workspace.default_temperature, |c| c.temperature),
            status_message: tui.notice_text().to_string(),
            streaming: workspace.message_is_streaming,
        };
        title_bar.render(frame, layout.title);

        let messages = selected.map(|c| c.messages.as_slice()).unwrap_or(&[]);
        MessageList::new(
            &mut tui.message_list,
            messages,
            workspace.message_is_streaming,
        )
        .render(frame, layout.messages);

        tui.composer.render(frame, layout.composer);
    }

    match &mut tui.overlay {
        Some(Overlay::ModelPicker(state)) => {
            let current = workspace.selected().and_then(|c| c.model.as_deref());
            ModelPicker::new(state, current).render(frame, area);
        }
        Some(Overlay::Variables(state)) => VariableModal::new(state).render(frame, area),
        Some(Overlay::CodeBlocks(state)) => CodeBlocks::new(state).render(frame, area),
        None => {}
    }
}
