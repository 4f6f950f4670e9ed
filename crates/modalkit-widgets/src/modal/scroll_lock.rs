#![forbid(unsafe_code)]

//! Page scroll lock (`modal-open` on the body).
//!
//! The lock also owns the body's scrollbar compensation. The first holder
//! records the pre-lock inline padding and pads the body; later holders
//! reuse that compensation. The recorded value is restored exactly once, when
//! the page actually unlocks, so overlapping dialogs never restore each
//! other's padded values.

use modalkit_core::document::{Document, ElementId};

use super::scrollbar::{self, SavedPadding, ScrollbarState};

/// Class marking the body while a dialog is open.
pub const MODAL_OPEN_CLASS: &str = "modal-open";

/// How concurrent dialogs share the body lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Any release unlocks the page, even if another dialog is still open.
    #[default]
    Shared,
    /// The page stays locked until every holder released.
    Counted,
}

/// Owner of the body `modal-open` class.
#[derive(Debug, Default)]
pub struct ScrollLock {
    policy: LockPolicy,
    holders: Vec<ElementId>,
    /// Body padding before the first holder locked; `Some` iff locked.
    saved_padding: Option<SavedPadding>,
}

impl ScrollLock {
    pub fn new(policy: LockPolicy) -> Self {
        Self {
            policy,
            holders: Vec::new(),
            saved_padding: None,
        }
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Lock the page on behalf of `dialog`, compensating for the scrollbar
    /// described by `state` unless the page is already locked.
    pub fn acquire(&mut self, doc: &mut Document, dialog: ElementId, state: ScrollbarState) {
        if !self.holders.contains(&dialog) {
            self.holders.push(dialog);
        }
        if self.saved_padding.is_none() {
            self.saved_padding = Some(scrollbar::set_scrollbar(doc, state));
        } else {
            tracing::trace!(%dialog, "page already locked; keeping body compensation");
        }
        doc.add_class(doc.body(), MODAL_OPEN_CLASS);
    }

    /// Drop `dialog`'s hold; unlock the page when the policy allows.
    pub fn release(&mut self, doc: &mut Document, dialog: ElementId) {
        self.holders.retain(|&held| held != dialog);
        let unlock = match self.policy {
            LockPolicy::Shared => true,
            LockPolicy::Counted => self.holders.is_empty(),
        };
        if unlock {
            self.holders.clear();
            doc.remove_class(doc.body(), MODAL_OPEN_CLASS);
            if let Some(saved) = self.saved_padding.take() {
                scrollbar::reset_scrollbar(doc, saved);
            }
        }
    }

    /// Whether `dialog` currently holds the lock.
    pub fn is_held_by(&self, dialog: ElementId) -> bool {
        self.holders.contains(&dialog)
    }

    pub fn is_locked(&self, doc: &Document) -> bool {
        doc.has_class(doc.body(), MODAL_OPEN_CLASS)
    }
}
