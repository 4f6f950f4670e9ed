#![forbid(unsafe_code)]

//! Event-loop primitives for modalkit.
//!
//! - [`Clock`]: monotonic time source (wall clock or manual).
//! - [`TimerQueue`]: deadline-ordered one-shot timers.
//! - [`TransitionWaits`]: continuations released by whichever comes first,
//!   a transition-end signal or a fallback timer.
//! - [`Signal`]: typed observer lists with RAII [`Subscription`]s, plus the
//!   [`Cancelable`] wrapper for "about to" notifications.
//!
//! Everything here is single-threaded; nothing blocks.

pub mod clock;
pub mod signal;
pub mod timer;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use signal::{Cancelable, Signal, Subscription};
pub use timer::{TimerId, TimerQueue};
pub use transition::{TransitionWaits, WaitId};
