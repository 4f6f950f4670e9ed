#![forbid(unsafe_code)]

//! Lifecycle notifications.
//!
//! Each dialog owns one [`ModalSignals`] bundle. Observers subscribe through
//! [`ModalHost::signals`](super::ModalHost::signals), which hands out the
//! same bundle before and after the controller exists.

use modalkit_core::document::ElementId;
use modalkit_runtime::{Cancelable, Signal};

/// Payload of `about_to_show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowRequest {
    pub dialog: ElementId,
    /// The element that triggered the show, if any.
    pub related_target: Option<ElementId>,
}

/// Payload of `about_to_hide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideRequest {
    pub dialog: ElementId,
}

/// Payload of `shown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shown {
    pub dialog: ElementId,
    pub related_target: Option<ElementId>,
}

/// Payload of `hidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hidden {
    pub dialog: ElementId,
}

/// Payload of `loaded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub dialog: ElementId,
    pub url: String,
}

/// Observer lists for one dialog.
///
/// Clones share the underlying lists.
#[derive(Debug, Clone, Default)]
pub struct ModalSignals {
    /// Cancelable; fires before anything changes.
    pub about_to_show: Signal<Cancelable<ShowRequest>>,
    pub shown: Signal<Shown>,
    /// Cancelable; fires before anything changes.
    pub about_to_hide: Signal<Cancelable<HideRequest>>,
    pub hidden: Signal<Hidden>,
    pub loaded: Signal<Loaded>,
}

impl ModalSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `about_to_show`; returns `true` when an observer canceled it.
    pub(crate) fn request_show(&self, dialog: ElementId, related_target: Option<ElementId>) -> bool {
        let mut event = Cancelable::new(ShowRequest {
            dialog,
            related_target,
        });
        self.about_to_show.emit(&mut event);
        event.is_default_prevented()
    }

    /// Emit `about_to_hide`; returns `true` when an observer canceled it.
    pub(crate) fn request_hide(&self, dialog: ElementId) -> bool {
        let mut event = Cancelable::new(HideRequest { dialog });
        self.about_to_hide.emit(&mut event);
        event.is_default_prevented()
    }
}
