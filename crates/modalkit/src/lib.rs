#![forbid(unsafe_code)]

//! modalkit: headless modal dialogs.
//!
//! Re-exports the workspace crates under one roof:
//!
//! - [`page`]: document model and input events
//! - [`runtime`]: clocks, timers, transition waits, signals
//! - [`widgets`]: the modal controller and host
//!
//! Most embedders only need the [`prelude`].
//!
//! ```
//! use modalkit::prelude::*;
//!
//! let mut doc = Document::new(800.0, 600.0);
//! let dialog = doc.create_element("div");
//! doc.set_attribute(dialog, "id", "thanks");
//! doc.append_child(doc.body(), dialog);
//!
//! let mut host = ModalHost::with_clock(doc, ManualClock::new());
//! assert_eq!(host.show("#thanks", None), Some(LifecycleOutcome::Started));
//! assert_eq!(host.phase(dialog), Some(ModalPhase::Shown));
//! ```

pub use modalkit_core as page;
pub use modalkit_runtime as runtime;
pub use modalkit_widgets as widgets;

pub use modalkit_core::{Document, ElementId, Event, EventFlow};
pub use modalkit_widgets::modal::{
    BackdropMode, LifecycleOutcome, ModalHost, ModalOptions, ModalOptionsPatch, ModalPhase,
    ModalVerb,
};

/// Common imports.
pub mod prelude {
    pub use modalkit_core::{Document, ElementId, Event, EventFlow, KeyCode, KeyEvent};
    pub use modalkit_runtime::{Clock, ManualClock, SystemClock};
    pub use modalkit_widgets::modal::{
        BackdropMode, ContentLoader, Invocation, LifecycleOutcome, LockPolicy, ModalHost,
        ModalOptions, ModalOptionsPatch, ModalPhase, ModalSignals, ModalVerb, StaticLoader,
    };
}
