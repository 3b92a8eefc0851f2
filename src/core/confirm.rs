//! # Confirmation Gate
//!
//! Two-step "arm, then confirm or cancel" gate used by destructive row actions
//! (folder rename/delete, clearing conversations).
//!
//! ```text
//!   Idle ──arm(a)──▶ Armed(a) ──confirm()──▶ Idle   (yields `a` exactly once)
//!                       │
//!                       ├──cancel()──▶ Idle         (pending `a` discarded)
//!                       └──arm(b)───▶ Armed(b)      (`a` discarded)
//! ```
//!
//! Arming is never destructive by itself. The pending action is moved out on
//! confirm, so a single arming can fire its callback at most once.

/// Pending action for a folder row. Rename carries the in-progress draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Rename { draft: String },
    Delete,
}

/// Generic confirmation gate over the kind of action awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation<A> {
    pending: Option<A>,
}

impl<A> Default for Confirmation<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> Confirmation<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the gate with `action`. Any previously armed action is dropped.
    pub fn arm(&mut self, action: A) {
        self.pending = Some(action);
    }

    /// Take the armed action, returning the gate to idle.
    pub fn confirm(&mut self) -> Option<A> {
        self.pending.take()
    }

    /// Discard the armed action. Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&A> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut A> {
        self.pending.as_mut()
    }
}

impl Confirmation<RowAction> {
    pub fn is_renaming(&self) -> bool {
        matches!(self.pending, Some(RowAction::Rename { .. }))
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.pending, Some(RowAction::Delete))
    }

    /// The rename draft, if a rename is armed.
    pub fn draft(&self) -> Option<&str> {
        match &self.pending {
            Some(RowAction::Rename { draft }) => Some(draft),
            _ => None,
        }
    }

    /// Mutable access to the rename draft, if a rename is armed.
    pub fn draft_mut(&mut self) -> Option<&mut String> {
        match self.pending_mut() {
            Some(RowAction::Rename { draft }) => Some(draft),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gate_is_idle() {
        let gate: Confirmation<()> = Confirmation::new();
        assert!(!gate.is_armed());
        assert_eq!(gate.pending(), None);
    }

    #[test]
    fn test_confirm_yields_action_once() {
        let mut gate = Confirmation::new();
        gate.arm(RowAction::Delete);
        assert_eq!(gate.confirm(), Some(RowAction::Delete));
        assert_eq!(gate.confirm(), None, "second confirm must not fire again");
        assert!(!gate.is_armed());
    }

    #[test]
    fn test_confirm_when_idle_is_noop() {
        let mut gate: Confirmation<RowAction> = Confirmation::new();
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn test_cancel_discards_pending() {
        let mut gate = Confirmation::new();
        gate.arm(RowAction::Rename {
            draft: "Work".to_string(),
        });
        assert!(gate.cancel());
        assert!(!gate.is_armed());
        assert!(!gate.cancel(), "cancel on idle gate reports nothing pending");
    }

    #[test]
    fn test_arming_delete_replaces_rename() {
        let mut gate = Confirmation::new();
        gate.arm(RowAction::Rename {
            draft: "Work".to_string(),
        });
        gate.arm(RowAction::Delete);
        assert!(gate.is_deleting());
        assert!(!gate.is_renaming());
        assert_eq!(gate.draft(), None);
    }

    #[test]
    fn test_arming_rename_replaces_delete() {
        let mut gate = Confirmation::new();
        gate.arm(RowAction::Delete);
        gate.arm(RowAction::Rename {
            draft: "Home".to_string(),
        });
        assert!(gate.is_renaming());
        assert!(!gate.is_deleting());
        assert_eq!(gate.draft(), Some("Home"));
    }

    #[test]
    fn test_draft_mut_edits_in_place() {
        let mut gate = Confirmation::new();
        gate.arm(RowAction::Rename {
            draft: "Wor".to_string(),
        });
        if let Some(draft) = gate.draft_mut() {
            draft.push('k');
        }
        assert_eq!(
            gate.confirm(),
            Some(RowAction::Rename {
                draft: "Work".to_string()
            })
        );
    }
}
