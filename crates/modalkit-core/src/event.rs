#![forbid(unsafe_code)]

//! Input events delivered to the modal host.
//!
//! Events carry their target element where one exists. Keyboard events have
//! no explicit target: like a browser, they go to whichever element
//! currently holds focus in the [`Document`](crate::document::Document).

use crate::document::ElementId;

/// Keys the modal layer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Char(char),
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a key press event.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Press,
        }
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is an Escape key press.
    pub fn is_escape_press(&self) -> bool {
        self.code == KeyCode::Escape && self.kind == KeyEventKind::Press
    }
}

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Keyboard input, targeted at the focused element.
    Key(KeyEvent),
    /// Primary-button activation of `target`.
    Click { target: ElementId },
    /// Focus moved onto `target`.
    Focus { target: ElementId },
    /// The viewport changed size.
    Resize { width: f32, height: f32 },
    /// A visual transition on `target` finished.
    TransitionEnd { target: ElementId },
}

impl Event {
    /// Shorthand for an Escape key press.
    pub const fn escape() -> Self {
        Self::Key(KeyEvent::new(KeyCode::Escape))
    }

    /// The element the event was aimed at, if it names one.
    pub fn target(&self) -> Option<ElementId> {
        match *self {
            Self::Click { target } | Self::Focus { target } | Self::TransitionEnd { target } => {
                Some(target)
            }
            Self::Key(_) | Self::Resize { .. } => None,
        }
    }
}

/// Default-action state of a dispatched event.
///
/// Handlers call [`prevent_default`](Self::prevent_default) to tell the
/// embedder not to perform the platform action (following a link, for
/// instance). The flag is sticky for the lifetime of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFlow {
    default_prevented: bool,
}

impl EventFlow {
    /// Fresh flow with the default action still enabled.
    pub const fn new() -> Self {
        Self {
            default_prevented: false,
        }
    }

    /// Suppress the event's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler suppressed the default action.
    #[inline]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
