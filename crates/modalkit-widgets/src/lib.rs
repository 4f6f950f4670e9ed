#![forbid(unsafe_code)]

//! Widgets for modalkit.
//!
//! The only widget family today is [`modal`]: the dialog lifecycle
//! controller and the host that owns page-wide modal state.

pub mod modal;

pub use modal::{
    BackdropMode, LifecycleOutcome, ModalController, ModalHost, ModalOptions, ModalOptionsPatch,
    ModalPhase, ModalSignals, ModalVerb,
};
