//! # Folder Rows
//!
//! Per-folder interaction state for the sidebar tree: open/closed, the
//! rename/delete confirmation, and drag-and-drop highlight.
//!
//! ```text
//!  is_open() = search_active || manual_open
//!
//!  toggle()         flips manual_open (ignored while renaming)
//!  set_search(..)   forces open without touching manual_open
//!  drop(..)         clears highlight, forces manual_open = true,
//!                   hands the payload to placement
//! ```
//!
//! Rows never edit a [`Folder`]; confirming returns an [`Intent`] for the
//! workspace to apply.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::core::confirm::{Confirmation, RowAction};
use crate::core::intent::Intent;
use crate::core::placement::{DragPayload, ReassignmentIntent, place};
use crate::core::workspace::{Folder, ItemKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    EmptyName,
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameError::EmptyName => write!(f, "Folder name cannot be empty"),
        }
    }
}

impl std::error::Error for RenameError {}

/// Visual drop-target state consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropHighlight {
    #[default]
    Idle,
    DragOver,
}

/// What the submit key did inside a folder row.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was armed, or the line-break modifier was held.
    Ignored,
    Committed(Intent),
    Rejected(RenameError),
}

#[derive(Debug, Default)]
pub struct FolderRowState {
    manual_open: bool,
    search_active: bool,
    pub confirm: Confirmation<RowAction>,
    pub highlight: DropHighlight,
}

impl FolderRowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_active = !term.is_empty();
    }

    pub fn is_open(&self) -> bool {
        self.search_active || self.manual_open
    }

    /// The preference the row returns to when the search clears.
    pub fn manual_open(&self) -> bool {
        self.manual_open
    }

    /// Row click. Clicks are swallowed by the rename field while it is open.
    pub fn toggle(&mut self) {
        if self.confirm.is_renaming() {
            return;
        }
        self.manual_open = !self.manual_open;
    }

    pub fn arm_rename(&mut self, folder: &Folder) {
        self.confirm.arm(RowAction::Rename {
            draft: folder.name.clone(),
        });
    }

    pub fn arm_delete(&mut self) {
        self.confirm.arm(RowAction::Delete);
    }

    /// Second click on the check mark.
    ///
    /// A blank rename draft is rejected and stays armed so the user can fix it.
    pub fn confirm(&mut self, folder: &Folder) -> Result<Option<Intent>, RenameError> {
        if let Some(RowAction::Rename { draft }) = self.confirm.pending()
            && draft.trim().is_empty()
        {
            debug!("Rejected empty rename for folder {}", folder.id);
            return Err(RenameError::EmptyName);
        }
        let intent = self.confirm.confirm().map(|action| match action {
            RowAction::Rename { draft } => Intent::RenameFolder {
                id: folder.id.clone(),
                name: draft.trim().to_string(),
            },
            RowAction::Delete => Intent::DeleteFolder {
                id: folder.id.clone(),
            },
        });
        Ok(intent)
    }

    pub fn cancel(&mut self) -> bool {
        self.confirm.cancel()
    }

    /// Submit key while the row is focused. Only commits a rename; the
    /// line-break modifier turns it into a no-op.
    pub fn submit_key(&mut self, folder: &Folder, line_break_modifier: bool) -> SubmitOutcome {
        if line_break_modifier || !self.confirm.is_renaming() {
            return SubmitOutcome::Ignored;
        }
        match self.confirm(folder) {
            Ok(Some(intent)) => SubmitOutcome::Committed(intent),
            Ok(None) => SubmitOutcome::Ignored,
            Err(e) => SubmitOutcome::Rejected(e),
        }
    }

    pub fn drag_enter(&mut self) {
        self.highlight = DropHighlight::DragOver;
    }

    pub fn drag_leave(&mut self) {
        self.highlight = DropHighlight::Idle;
    }

    /// Returns true to accept the drop, suppressing the default handling.
    pub fn drag_over(&self) -> bool {
        true
    }

    /// Drop onto this row. Always opens the folder; returns the
    /// reassignment if the payload names exactly one item of `kind`.
    pub fn drop(
        &mut self,
        folder: &Folder,
        kind: ItemKind,
        payload: &DragPayload,
    ) -> Option<ReassignmentIntent> {
        self.highlight = DropHighlight::Idle;
        self.manual_open = true;
        match place(payload, kind, Some(&folder.id)) {
            Ok(intent) => Some(intent),
            Err(e) => {
                debug!("Drop on folder {} rejected: {}", folder.id, e);
                None
            }
        }
    }
}

/// Row state for every folder, keyed by folder id. Rows for folders that
/// no longer exist are pruned on [`FolderTree::sync`].
#[derive(Debug, Default)]
pub struct FolderTree {
    rows: HashMap<String, FolderRowState>,
    search_term: String,
}

impl FolderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
        for row in self.rows.values_mut() {
            row.set_search_term(term);
        }
    }

    /// Keep row state in step with the current folder snapshot.
    pub fn sync<'a>(&mut self, folders: impl IntoIterator<Item = &'a Folder>) {
        let ids: Vec<&str> = folders.into_iter().map(|f| f.id.as_str()).collect();
        self.rows.retain(|id, _| ids.contains(&id.as_str()));
        for id in ids {
            if !self.rows.contains_key(id) {
                let mut row = FolderRowState::new();
                row.set_search_term(&self.search_term);
                self.rows.insert(id.to_string(), row);
            }
        }
    }

    pub fn row(&self, id: &str) -> Option<&FolderRowState> {
        self.rows.get(id)
    }

    pub fn row_mut(&mut self, id: &str) -> &mut FolderRowState {
        let search_term = &self.search_term;
        self.rows.entry(id.to_string()).or_insert_with(|| {
            let mut row = FolderRowState::new();
            row.set_search_term(search_term);
            row
        })
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.rows
            .get(id)
            .map(|r| r.is_open())
            .unwrap_or(!self.search_term.is_empty())
    }

    /// Clear every row's highlight, e.g. when a drag ends outside any row.
    pub fn clear_highlights(&mut self) {
        for row in self.rows.values_mut() {
            row.drag_leave();
        }
    }

    /// The row currently armed for rename or delete, if any.
    pub fn armed(&self) -> Option<&str> {
        self.rows
            .iter()
            .find(|(_, row)| row.confirm.is_armed())
            .map(|(id, _)| id.as_str())
    }

    /// Cancel every pending confirmation. Returns true if anything was armed.
    pub fn cancel_all(&mut self) -> bool {
        self.rows
            .values_mut()
            .fold(false, |any, row| row.cancel() || any)
    }
}
