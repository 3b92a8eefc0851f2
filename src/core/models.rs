//! # Model Selection
//!
//! Model list entries (from config), the selection fallback applied when a
//! conversation names a model that is no longer installed, and the
//! temperature slider's value rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::intent::{ConversationField, Intent};
use crate::core::workspace::Conversation;

pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelInfo {
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// "4.11 GB" style size label.
pub fn bytes_to_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / 1e9)
}

/// "3 hours ago" style label for how long ago `then` was.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let mins = seconds / 60;
    let hours = mins / 60;
    let days = hours / 24;

    let plural = |n: i64| if n == 1 { "" } else { "s" };
    if days > 0 {
        format!("{} day{} ago", days, plural(days))
    } else if hours > 0 {
        format!("{} hour{} ago", hours, plural(hours))
    } else {
        format!("{} minute{} ago", mins, plural(mins))
    }
}

/// The model a conversation should display.
///
/// If the conversation's model is installed it is used as-is. Otherwise the
/// first model is selected and an `UpdateConversationField` intent is
/// returned so the workspace records the substitution.
pub fn resolve_model<'a>(
    models: &'a [ModelInfo],
    conversation: Option<&Conversation>,
) -> (Option<&'a ModelInfo>, Option<Intent>) {
    let current = conversation
        .and_then(|c| c.model.as_deref())
        .and_then(|name| models.iter().find(|m| m.name == name));
    if current.is_some() {
        return (current, None);
    }

    let fallback = models.first();
    let intent = match (conversation, fallback) {
        (Some(c), Some(model)) => Some(Intent::UpdateConversationField {
            conversation_id: c.id.clone(),
            field: ConversationField::Model(model.name.clone()),
        }),
        _ => None,
    };
    (fallback, intent)
}

/// Clamp to the slider range and snap to one decimal place.
pub fn clamp_temperature(value: f32) -> f32 {
    if !value.is_finite() {
        return DEFAULT_TEMPERATURE;
    }
    let snapped = (value / TEMPERATURE_STEP).round() * TEMPERATURE_STEP;
    (snapped.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE) * 10.0).round() / 10.0
}

/// Move the temperature by `steps` slider notches.
pub fn step_temperature(current: f32, steps: i32) -> f32 {
    clamp_temperature(current + steps as f32 * TEMPERATURE_STEP)
}

/// Label shown under the slider for a given value.
pub fn temperature_label(value: f32) -> &'static str {
    if value < 0.35 {
        "Precise"
    } else if value < 0.7 {
        "Neutral"
    } else {
        "Creative"
    }
}
