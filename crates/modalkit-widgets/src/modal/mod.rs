#![forbid(unsafe_code)]

//! Modal dialogs: lifecycle controller, backdrop, focus enforcement,
//! scrollbar compensation and the registry that wires them to input.
//!
//! # Overview
//!
//! - [`ModalController`] drives one dialog through
//!   `Hidden → Showing → Shown → Hiding → Hidden`.
//! - [`ModalHost`] owns the [`Document`](modalkit_core::Document), creates
//!   controllers on first use, routes [`Event`](modalkit_core::Event)s and
//!   resumes parked transition steps from [`ModalHost::pump`].
//! - [`ModalOptions`] / [`ModalOptionsPatch`] resolve configuration from host
//!   defaults, `data-*` attributes and call-site overrides.
//! - [`ModalSignals`] carries the `about_to_show`, `shown`, `about_to_hide`,
//!   `hidden` and `loaded` notifications.
//!
//! # Example
//!
//! ```
//! use modalkit_core::{Document, Event};
//! use modalkit_runtime::ManualClock;
//! use modalkit_widgets::modal::{ModalHost, ModalPhase};
//!
//! let mut doc = Document::new(1024.0, 768.0);
//! let dialog = doc.create_element("div");
//! doc.set_attribute(dialog, "id", "pledge");
//! doc.set_displayed(dialog, false);
//! doc.append_child(doc.body(), dialog);
//!
//! let mut host = ModalHost::with_clock(doc, ManualClock::new());
//! host.show("#pledge", None);
//! assert_eq!(host.phase(dialog), Some(ModalPhase::Shown));
//!
//! host.document_mut().focus(dialog);
//! host.dispatch(Event::escape());
//! assert_eq!(host.phase(dialog), Some(ModalPhase::Hidden));
//! ```

pub mod backdrop;
mod config;
mod controller;
mod events;
mod focus;
mod host;
mod remote;
mod scroll_lock;
pub mod scrollbar;

pub use config::{
    BACKDROP_TRANSITION_DURATION, BackdropMode, ConfigError, Invocation, ModalOptions,
    ModalOptionsPatch, ModalVerb, TRANSITION_DURATION,
};
pub use controller::{
    Continuation, LifecycleOutcome, Listeners, ModalController, ModalEnv, ModalPhase,
};
pub use events::{HideRequest, Hidden, Loaded, ModalSignals, ShowRequest, Shown};
pub use focus::FocusEnforcer;
pub use host::{CONTENT_CLASS, ModalHost, ModalTarget};
pub use remote::{ContentLoader, LoadError, LoadId, LoadRequest, LoadSink, StaticLoader};
pub use scroll_lock::{LockPolicy, MODAL_OPEN_CLASS, ScrollLock};
