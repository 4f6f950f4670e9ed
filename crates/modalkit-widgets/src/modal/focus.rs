#![forbid(unsafe_code)]

//! Focus enforcement slot.
//!
//! One dialog at a time owns the slot. While it does, any focus landing
//! outside the owner (other than on the document root) is pulled back to it.
//!
//! # Invariants
//!
//! - At most one owner. [`FocusEnforcer::acquire`] replaces the previous
//!   owner rather than stacking on top of it.
//! - [`FocusEnforcer::release`] empties the slot whoever calls it, so hiding
//!   any dialog ends enforcement for the page.

use modalkit_core::document::{Document, ElementId};

#[derive(Debug, Default)]
pub struct FocusEnforcer {
    owner: Option<ElementId>,
}

impl FocusEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `dialog` the enforced dialog.
    pub fn acquire(&mut self, dialog: ElementId) {
        if let Some(previous) = self.owner.replace(dialog)
            && previous != dialog
        {
            tracing::debug!(%previous, %dialog, "focus enforcement handed over");
        }
    }

    /// Clear the slot.
    pub fn release(&mut self) {
        self.owner = None;
    }

    pub fn owner(&self) -> Option<ElementId> {
        self.owner
    }

    /// React to focus landing on `target`.
    ///
    /// Returns `true` when focus was redirected to the owner.
    pub fn enforce(&self, doc: &mut Document, target: ElementId) -> bool {
        let Some(owner) = self.owner else {
            return false;
        };
        if target == doc.root() || doc.contains(owner, target) {
            return false;
        }
        doc.focus(owner);
        true
    }
}
