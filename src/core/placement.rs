//! # Item Placement
//!
//! Maps a drag-and-drop payload onto a folder reassignment.
//!
//! A drag started on a conversation or prompt row carries a payload entry
//! keyed by the item kind (`"conversation"` / `"prompt"`) whose value is a
//! JSON object with at least an `"id"` string. Anything else is rejected
//! without side effects.
//!
//! ```text
//! DragPayload ──place()──▶ Ok(ReassignmentIntent) ──apply()──▶ folder_id updated on one item
//!                    └───▶ Err(InvalidDropPayload)            (nothing changes)
//! ```

use std::fmt;

use serde_json::{Value, json};

use crate::core::workspace::{FolderMember, ItemKind};

/// Raw data carried by a drag operation, keyed by format name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragPayload {
    entries: Vec<(String, String)>,
}

impl DragPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload for dragging a single conversation or prompt row.
    pub fn for_item(kind: ItemKind, id: &str) -> Self {
        let mut payload = Self::new();
        payload.set_data(kind.payload_key(), &json!({ "id": id }).to_string());
        payload
    }

    pub fn set_data(&mut self, format: &str, data: &str) {
        self.entries.push((format.to_string(), data.to_string()));
    }

    /// All values stored under `format`.
    fn values<'a>(&'a self, format: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == format)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Request to set `folder_id = target` on exactly one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentIntent {
    pub kind: ItemKind,
    pub item_id: String,
    /// `None` moves the item out of any folder.
    pub target: Option<String>,
}

impl ReassignmentIntent {
    /// Apply to a collection. Only the named item's `folder_id` is touched.
    ///
    /// Returns true if anything changed. Dropping onto the item's current
    /// folder, or naming an item that no longer exists, changes nothing.
    pub fn apply<T: FolderMember>(&self, items: &mut [T]) -> bool {
        let Some(item) = items.iter_mut().find(|item| item.id() == self.item_id) else {
            return false;
        };
        if item.folder_id() == self.target.as_deref() {
            return false;
        }
        item.set_folder_id(self.target.clone());
        true
    }
}

/// The drop payload did not name exactly one item of the expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDropPayload(pub String);

impl fmt::Display for InvalidDropPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid drop payload: {}", self.0)
    }
}

impl std::error::Error for InvalidDropPayload {}

/// Resolve a drop onto a folder of `target_kind` into a reassignment.
pub fn place(
    payload: &DragPayload,
    target_kind: ItemKind,
    target: Option<&str>,
) -> Result<ReassignmentIntent, InvalidDropPayload> {
    let other_kind = match target_kind {
        ItemKind::Conversation => ItemKind::Prompt,
        ItemKind::Prompt => ItemKind::Conversation,
    };
    if payload.values(other_kind.payload_key()).next().is_some() {
        return Err(InvalidDropPayload(format!(
            "carries a {} where a {} was expected",
            other_kind.payload_key(),
            target_kind.payload_key()
        )));
    }

    let mut values = payload.values(target_kind.payload_key());
    let raw = values
        .next()
        .ok_or_else(|| InvalidDropPayload(format!("no {} entry", target_kind.payload_key())))?;
    if values.next().is_some() {
        return Err(InvalidDropPayload("more than one item".to_string()));
    }

    let item: Value =
        serde_json::from_str(raw).map_err(|e| InvalidDropPayload(e.to_string()))?;
    // Only an object with a string id; arrays would otherwise match by position
    let item_id = item
        .as_object()
        .and_then(|fields| fields.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| InvalidDropPayload("item is not an object with a string id".to_string()))?
        .trim();
    if item_id.is_empty() {
        return Err(InvalidDropPayload("empty item id".to_string()));
    }

    Ok(ReassignmentIntent {
        kind: target_kind,
        item_id: item_id.to_string(),
        target: target.map(str::to_string),
    })
}
