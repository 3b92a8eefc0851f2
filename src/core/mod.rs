//! # Core Interaction Logic
//!
//! Nook's state machines and the workspace they act on.
//! Nothing here knows about terminals or widgets.
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                    CORE                      │
//!   │                                              │
//!   │  folder ──▶ confirm      composer ──▶ speech │
//!   │     │                                  │     │
//!   │     ▼                                  ▼     │
//!   │  placement                          capture  │
//!   │                                              │
//!   │        every change leaves as an Intent      │
//!   └──────────────────────┬───────────────────────┘
//!                          ▼
//!                ┌───────────────────┐
//!                │ workspace (owner) │
//!                └───────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`confirm`]: arm/confirm/cancel gate for destructive actions
//! - [`folder`]: folder row open state, rename/delete, drop target
//! - [`placement`]: drag payload → folder reassignment
//! - [`speech`]: dictation session lifecycle
//! - [`capture`]: speech capture backends
//! - [`composer`]: message buffer, send guard, dictation merge
//! - [`scroll`]: message list pinning and "jump to bottom"
//! - [`intent`]: the `Intent` enum and `IntentSink`
//! - [`workspace`]: folders, conversations and prompts; the only writer
//! - [`variables`]: `{{variable}}` prompt form
//! - [`models`]: model list and temperature rules
//! - [`clipboard`]: code block copy/save
//! - [`config`]: `~/.nook/config.toml`

pub mod capture;
pub mod clipboard;
pub mod composer;
pub mod config;
pub mod confirm;
pub mod folder;
pub mod intent;
pub mod models;
pub mod placement;
pub mod scroll;
pub mod speech;
pub mod variables;
pub mod workspace;
