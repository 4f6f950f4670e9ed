#![forbid(unsafe_code)]

//! Typed observer lists.
//!
//! A [`Signal<E>`] is a list of callbacks invoked with `&mut E` every time
//! the signal is emitted. Subscribing returns a [`Subscription`] guard that
//! removes the callback when dropped; call [`Subscription::detach`] to keep
//! the callback for the lifetime of the signal instead.
//!
//! Cancelable notifications wrap their payload in [`Cancelable<T>`]: any
//! observer may call [`Cancelable::prevent_default`], and the emitter checks
//! the flag after every observer ran.
//!
//! # Invariants
//!
//! 1. Observers run in subscription order.
//! 2. Every observer subscribed before `emit` starts sees the event, even if
//!    an earlier observer cancels it; cancellation is advisory.
//! 3. Observers subscribed or dropped during an emit take effect from the
//!    next emit.
//! 4. Clones of a `Signal` share one observer list.
//!
//! # Failure Modes
//!
//! - Observer panic: propagates to the caller of `emit`.
//! - Signal dropped while a `Subscription` is alive: dropping the guard is a
//!   no-op (it only holds a weak reference).

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<dyn Fn(&mut E)>;

struct Slots<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// A typed, single-threaded observer list.
pub struct Signal<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl<E: 'static> Signal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered while the guard lives.
    #[must_use = "dropping the subscription unregisters the observer"]
    pub fn subscribe(&self, callback: impl Fn(&mut E) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Invoke every observer with `event`.
    pub fn emit(&self, event: &mut E) {
        let snapshot: Vec<Callback<E>> = self
            .slots
            .borrow()
            .entries
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }
}

impl<E> Signal<E> {
    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.slots.borrow().entries.len()
    }
}

/// RAII guard for a [`Signal`] observer.
#[must_use = "dropping the subscription unregisters the observer"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the observer registered for the lifetime of the signal.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Payload of a notification whose default action observers may cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancelable<T> {
    detail: T,
    prevented: bool,
}

impl<T> Cancelable<T> {
    pub fn new(detail: T) -> Self {
        Self {
            detail,
            prevented: false,
        }
    }

    /// Cancel the action this notification announces.
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    #[inline]
    pub fn is_default_prevented(&self) -> bool {
        self.prevented
    }

    pub fn into_inner(self) -> T {
        self.detail
    }
}

impl<T> Deref for Cancelable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.detail
    }
}
