#![forbid(unsafe_code)]

//! Backdrop element lifecycle.
//!
//! The controller owns at most one backdrop at a time. It is created on show,
//! faded in, faded out on hide and then discarded.

use modalkit_core::document::{Document, ElementId};

use super::config::BackdropMode;

pub const BACKDROP_CLASS: &str = "modal-backdrop";
/// Marks an element whose visibility changes are animated.
pub const FADE_CLASS: &str = "fade";
/// Visible state of a dialog or backdrop.
pub const IN_CLASS: &str = "in";

/// What a click on the backdrop does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropClick {
    Dismiss,
    Refocus,
}

impl BackdropClick {
    pub fn for_mode(mode: BackdropMode) -> Option<Self> {
        match mode {
            BackdropMode::Dismissible => Some(Self::Dismiss),
            BackdropMode::Static => Some(Self::Refocus),
            BackdropMode::Disabled => None,
        }
    }
}

/// Create a backdrop at the end of the body.
pub fn create(doc: &mut Document, animate: bool) -> ElementId {
    let backdrop = doc.create_element("div");
    doc.add_class(backdrop, BACKDROP_CLASS);
    if animate {
        doc.add_class(backdrop, FADE_CLASS);
    }
    doc.append_child(doc.body(), backdrop);
    backdrop
}

/// Start the fade-in.
///
/// An animated backdrop needs a layout pass between insertion and the `in`
/// class, otherwise the transition is skipped.
pub fn reveal(doc: &mut Document, backdrop: ElementId, animate: bool) {
    if animate {
        let _ = doc.offset_width(backdrop);
        tracing::trace!(%backdrop, "forced reflow before backdrop fade-in");
    }
    doc.add_class(backdrop, IN_CLASS);
}

/// Start the fade-out.
pub fn conceal(doc: &mut Document, backdrop: ElementId) {
    doc.remove_class(backdrop, IN_CLASS);
}

pub fn discard(doc: &mut Document, backdrop: ElementId) {
    doc.remove(backdrop);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animated_backdrop_forces_layout_before_fade_in() {
        let mut doc = Document::new(800.0, 600.0);
        let backdrop = create(&mut doc, true);
        assert!(doc.has_class(backdrop, FADE_CLASS));
        assert_eq!(doc.parent(backdrop), Some(doc.body()));

        let reads = doc.layout_reads();
        reveal(&mut doc, backdrop, true);
        assert_eq!(doc.layout_reads(), reads + 1);
        assert!(doc.has_class(backdrop, IN_CLASS));
    }

    #[test]
    fn plain_backdrop_skips_reflow() {
        let mut doc = Document::new(800.0, 600.0);
        let backdrop = create(&mut doc, false);
        assert!(!doc.has_class(backdrop, FADE_CLASS));
        let reads = doc.layout_reads();
        reveal(&mut doc, backdrop, false);
        assert_eq!(doc.layout_reads(), reads);
    }

    #[test]
    fn conceal_then_discard() {
        let mut doc = Document::new(800.0, 600.0);
        let backdrop = create(&mut doc, false);
        reveal(&mut doc, backdrop, false);
        conceal(&mut doc, backdrop);
        assert!(!doc.has_class(backdrop, IN_CLASS));
        discard(&mut doc, backdrop);
        assert!(doc.elements_with_class(BACKDROP_CLASS).is_empty());
    }

    #[test]
    fn click_behavior_follows_mode() {
        assert_eq!(
            BackdropClick::for_mode(BackdropMode::Dismissible),
            Some(BackdropClick::Dismiss)
        );
        assert_eq!(
            BackdropClick::for_mode(BackdropMode::Static),
            Some(BackdropClick::Refocus)
        );
        assert_eq!(BackdropClick::for_mode(BackdropMode::Disabled), None);
    }
}
