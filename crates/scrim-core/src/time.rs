#![forbid(unsafe_code)]

//! Fire-once deferred actions driven by explicit time advancement.
//!
//! A [`DeferredQueue`] is the engine's only asynchronous primitive: the
//! stand-in for a transition-end timer. Actions are scheduled with a delay
//! and fire when the host pumps the queue past their due time via
//! [`DeferredQueue::advance`]. Nothing ever fires synchronously inside
//! `defer` — a zero-delay action still waits for the next `advance`, which
//! keeps notification ordering stable even at zero duration.
//!
//! # Invariants
//!
//! - Each action fires exactly once and is then gone.
//! - Actions fire in (due time, insertion) order.
//! - There is no cancellation; a scheduled action always fires.
//!
//! # Failure Modes
//!
//! - `advance` with a zero delta still fires anything already due.
//! - Clock arithmetic saturates; the queue never panics on overflow.

use std::time::Duration;

/// Handle identifying a scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeferredId(u64);

impl DeferredId {
    /// Get the raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry<A> {
    id: DeferredId,
    due: Duration,
    action: A,
}

/// Queue of fire-once deferred actions.
///
/// The queue keeps its own monotonic clock, advanced only by
/// [`DeferredQueue::advance`]. Delays are relative to the clock at
/// scheduling time.
#[derive(Debug, Clone)]
pub struct DeferredQueue<A> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> DeferredQueue<A> {
    /// Create an empty queue with its clock at zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Current queue clock.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of actions waiting to fire.
    #[inline]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Whether no actions are waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `action` to fire once `delay` has elapsed.
    pub fn defer(&mut self, delay: Duration, action: A) -> DeferredId {
        let id = DeferredId(self.next_id);
        self.next_id += 1;
        let due = self.now.checked_add(delay).unwrap_or(Duration::MAX);
        self.entries.push(Entry { id, due, action });
        id
    }

    /// Advance the clock by `delta` and return every action that came due,
    /// in (due time, insertion) order.
    pub fn advance(&mut self, delta: Duration) -> Vec<A> {
        self.now = self.now.checked_add(delta).unwrap_or(Duration::MAX);
        let now = self.now;
        let mut due: Vec<Entry<A>> = Vec::new();
        let mut rest: Vec<Entry<A>> = Vec::new();
        for entry in self.entries.drain(..) {
            if entry.due <= now {
                due.push(entry);
            } else {
                rest.push(entry);
            }
        }
        self.entries = rest;
        // Entries are in insertion order; a stable sort by due time keeps
        // insertion order among equal deadlines.
        due.sort_by_key(|e| e.due);
        due.into_iter().map(|e| e.action).collect()
    }
}
