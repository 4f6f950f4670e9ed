#![forbid(unsafe_code)]

//! Deadline-ordered one-shot timers.
//!
//! # Invariants
//!
//! - Timers fire in `(deadline, scheduling order)` order, so two timers with
//!   the same deadline fire in the order they were scheduled.
//! - A timer fires at most once; canceled timers never fire.
//! - [`TimerId`]s are never reused within a queue.

use std::collections::BTreeMap;
use std::time::Duration;

use ahash::AHashMap;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Queue of pending one-shot timers carrying a payload.
#[derive(Debug)]
pub struct TimerQueue<M> {
    by_deadline: BTreeMap<(Duration, TimerId), M>,
    deadlines: AHashMap<TimerId, Duration>,
    next_id: u64,
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> TimerQueue<M> {
    pub fn new() -> Self {
        Self {
            by_deadline: BTreeMap::new(),
            deadlines: AHashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `payload` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: M) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = now.saturating_add(delay);
        self.by_deadline.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer, returning its payload.
    pub fn cancel(&mut self, id: TimerId) -> Option<M> {
        let deadline = self.deadlines.remove(&id)?;
        self.by_deadline.remove(&(deadline, id))
    }

    /// Pop the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, M)> {
        let (&(deadline, id), _) = self.by_deadline.first_key_value()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.by_deadline
            .remove(&(deadline, id))
            .map(|payload| (id, payload))
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.by_deadline.keys().next().map(|&(deadline, _)| deadline)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
