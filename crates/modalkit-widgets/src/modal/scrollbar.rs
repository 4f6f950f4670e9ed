#![forbid(unsafe_code)]

//! Scrollbar compensation.
//!
//! Locking page scroll removes the body scrollbar, which would shift the page
//! sideways by the gutter width. While a dialog is open the body receives
//! extra right padding equal to that width, and a dialog taller than the
//! viewport is padded on the side where the gutter would sit.
//!
//! # Invariants
//!
//! - [`set_scrollbar`] returns the inline padding it replaced;
//!   [`reset_scrollbar`] restores exactly that value.
//! - The measurement probe never outlives [`measure_scrollbar`].

use modalkit_core::document::{Document, ElementId};

/// Class of the temporary element used to measure the scrollbar gutter.
pub const SCROLLBAR_MEASURE_CLASS: &str = "modal-scrollbar-measure";

const PROBE_SIZE: f32 = 100.0;

/// Page overflow state, recomputed on every show.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollbarState {
    pub body_is_overflowing: bool,
    pub scrollbar_width: f32,
}

/// Body inline right padding as it was before compensation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavedPadding(Option<f32>);

/// Measure whether the body overflows the viewport and the gutter width.
pub fn check_scrollbar(doc: &mut Document) -> ScrollbarState {
    let body_is_overflowing = doc.scroll_height(doc.body()) > doc.viewport().height;
    let scrollbar_width = measure_scrollbar(doc);
    ScrollbarState {
        body_is_overflowing,
        scrollbar_width,
    }
}

/// Width of the platform scrollbar gutter, read from a throwaway probe.
pub fn measure_scrollbar(doc: &mut Document) -> f32 {
    let probe = doc.create_element("div");
    doc.add_class(probe, SCROLLBAR_MEASURE_CLASS);
    {
        let style = doc.style_mut(probe);
        style.width = Some(PROBE_SIZE);
        style.height = Some(PROBE_SIZE);
    }
    doc.set_scroll_gutter(probe, true);
    doc.append_child(doc.body(), probe);
    let width = doc.offset_width(probe) - doc.client_width(probe);
    doc.remove(probe);
    tracing::trace!(width, "measured scrollbar gutter");
    width
}

/// Pad the body by the gutter width when it overflows.
pub fn set_scrollbar(doc: &mut Document, state: ScrollbarState) -> SavedPadding {
    let body = doc.body();
    let saved = SavedPadding(doc.style(body).padding_right);
    if state.body_is_overflowing {
        let padding = doc.computed_padding_right(body) + state.scrollbar_width;
        doc.style_mut(body).padding_right = Some(padding);
    }
    saved
}

/// Restore the body padding saved by [`set_scrollbar`].
pub fn reset_scrollbar(doc: &mut Document, saved: SavedPadding) {
    let body = doc.body();
    doc.style_mut(body).padding_right = saved.0;
}

/// Pad an over-tall dialog on the gutter side; clear padding otherwise.
pub fn adjust_dialog(doc: &mut Document, dialog: ElementId, state: ScrollbarState) {
    let overflowing = doc.scroll_height(dialog) > doc.viewport().height;
    let style = doc.style_mut(dialog);
    if overflowing {
        if state.body_is_overflowing {
            style.padding_left = None;
            style.padding_right = Some(state.scrollbar_width);
        } else {
            style.padding_left = Some(state.scrollbar_width);
            style.padding_right = None;
        }
    } else {
        style.padding_left = None;
        style.padding_right = None;
    }
}

/// Clear the paddings set by [`adjust_dialog`].
pub fn reset_adjustments(doc: &mut Document, dialog: ElementId) {
    let style = doc.style_mut(dialog);
    style.padding_left = None;
    style.padding_right = None;
}

/// Stretch the backdrop to the dialog's full scroll height.
pub fn adjust_backdrop(doc: &mut Document, backdrop: ElementId, dialog: ElementId) {
    doc.style_mut(backdrop).height = Some(0.0);
    let height = doc.scroll_height(dialog);
    doc.style_mut(backdrop).height = Some(height);
}
