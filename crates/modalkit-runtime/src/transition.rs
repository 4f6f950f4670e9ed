#![forbid(unsafe_code)]

//! Transition-end waits with a fallback timer.
//!
//! A visual transition normally announces its end with a transition-end
//! signal, but that signal is unreliable: the element may be hidden, the
//! transition may be interrupted, or the platform may never emit it. Each
//! wait therefore races two sources:
//!
//! 1. [`TransitionWaits::transition_ended`] for the wait's target element, and
//! 2. a fallback timer armed for the transition duration, drained with
//!    [`TransitionWaits::fire_due`].
//!
//! # Invariants
//!
//! - A continuation is released exactly once: the first source to resolve a
//!   wait removes it, and the other source finds nothing.
//! - A released continuation is never later than `armed_at + fallback`,
//!   provided the caller drains `fire_due` at or after that instant.
//! - Waits for the same target resolve in the order they were armed.

use std::time::Duration;

use modalkit_core::document::ElementId;

use crate::timer::{TimerId, TimerQueue};

/// Handle to an armed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitId(u64);

#[derive(Debug)]
struct Pending<C> {
    id: WaitId,
    target: ElementId,
    timer: TimerId,
    continuation: C,
}

/// Pending continuations keyed by transition target.
#[derive(Debug)]
pub struct TransitionWaits<C> {
    pending: Vec<Pending<C>>,
    timers: TimerQueue<WaitId>,
    next_id: u64,
}

impl<C> Default for TransitionWaits<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TransitionWaits<C> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            timers: TimerQueue::new(),
            next_id: 0,
        }
    }

    /// Wait for `target`'s transition-end, or `fallback` after `now`.
    pub fn arm(
        &mut self,
        now: Duration,
        target: ElementId,
        fallback: Duration,
        continuation: C,
    ) -> WaitId {
        let id = WaitId(self.next_id);
        self.next_id += 1;
        let timer = self.timers.schedule(now, fallback, id);
        tracing::trace!(wait = id.0, %target, ?fallback, "transition wait armed");
        self.pending.push(Pending {
            id,
            target,
            timer,
            continuation,
        });
        id
    }

    /// Resolve the oldest wait on `target`, disarming its fallback timer.
    ///
    /// Returns `None` when nothing waits on `target` (the signal is ignored).
    pub fn transition_ended(&mut self, target: ElementId) -> Option<C> {
        let idx = self.pending.iter().position(|p| p.target == target)?;
        let pending = self.pending.remove(idx);
        self.timers.cancel(pending.timer);
        tracing::trace!(wait = pending.id.0, %target, "transition ended");
        Some(pending.continuation)
    }

    /// Release every wait whose fallback deadline is at or before `now`,
    /// earliest deadline first.
    pub fn fire_due(&mut self, now: Duration) -> Vec<C> {
        let mut released = Vec::new();
        while let Some((_, wait)) = self.timers.pop_due(now) {
            if let Some(idx) = self.pending.iter().position(|p| p.id == wait) {
                let pending = self.pending.remove(idx);
                tracing::trace!(wait = wait.0, target = %pending.target, "fallback timer fired");
                released.push(pending.continuation);
            }
        }
        released
    }

    /// Drop every wait whose continuation matches `pred`. Returns how many
    /// were dropped.
    pub fn cancel_where(&mut self, pred: impl Fn(&C) -> bool) -> usize {
        let before = self.pending.len();
        let timers = &mut self.timers;
        self.pending.retain(|p| {
            if pred(&p.continuation) {
                timers.cancel(p.timer);
                false
            } else {
                true
            }
        });
        before - self.pending.len()
    }

    /// Whether `id` is still waiting.
    pub fn is_pending(&self, id: WaitId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Whether anything waits on `target`.
    pub fn is_waiting_on(&self, target: ElementId) -> bool {
        self.pending.iter().any(|p| p.target == target)
    }

    /// Earliest fallback deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
