//! Explicit delayed-event scheduling keyed by monotonic time.
//!
//! The engine never spawns threads or timers of its own: anything that must
//! happen "after duration D" is an entry in a [`TimerQueue`], drained by the
//! owner's periodic tick. Every entry carries a [`TimerHandle`] that the
//! resource it mutates is responsible for canceling on disposal or state
//! exit — a stale callback must never touch a since-reused voice or track.

use alloc::vec::Vec;

/// Cancellation token for a scheduled entry.
///
/// Handles are unique per queue and never reused, so canceling an
/// already-fired or already-canceled handle is a silent no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<E> {
    at: f64,
    handle: TimerHandle,
    payload: E,
}

/// A queue of delayed payloads ordered by fire time.
///
/// `pop_due` returns entries in (time, insertion) order, which keeps
/// same-tick callbacks deterministic.
pub struct TimerQueue<E> {
    entries: Vec<Entry<E>>,
    next_handle: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 0,
        }
    }

    /// Schedule `payload` to fire at absolute time `at`.
    pub fn schedule(&mut self, at: f64, payload: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            at,
            handle,
            payload,
        });
        handle
    }

    /// Cancel a pending entry. No-op if it already fired or was canceled.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    /// Remove and return every entry due at or before `now`, ordered by
    /// fire time (insertion order breaks ties).
    pub fn pop_due(&mut self, now: f64) -> Vec<E> {
        let mut due: Vec<(f64, u64, E)> = Vec::new();
        let mut rest: Vec<Entry<E>> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.at <= now {
                due.push((entry.at, entry.handle.0, entry.payload));
            } else {
                rest.push(entry);
            }
        }
        self.entries = rest;
        due.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(core::cmp::Ordering::Equal).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, payload)| payload).collect()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_time_order() {
        let mut q = TimerQueue::new();
        q.schedule(2.0, "b");
        q.schedule(1.0, "a");
        q.schedule(3.0, "c");
        assert_eq!(q.pop_due(2.5), alloc::vec!["a", "b"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(3.0), alloc::vec!["c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, "first");
        q.schedule(1.0, "second");
        assert_eq!(q.pop_due(1.0), alloc::vec!["first", "second"]);
    }

    #[test]
    fn canceled_entries_never_fire() {
        let mut q = TimerQueue::new();
        let keep = q.schedule(1.0, "keep");
        let drop = q.schedule(1.0, "drop");
        q.cancel(drop);
        assert_eq!(q.pop_due(10.0), alloc::vec!["keep"]);
        // Canceling after the fact is a silent no-op.
        q.cancel(keep);
        q.cancel(drop);
    }

    #[test]
    fn nothing_due_before_fire_time() {
        let mut q = TimerQueue::new();
        q.schedule(5.0, ());
        assert!(q.pop_due(4.999).is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, ());
        q.schedule(2.0, ());
        q.clear();
        assert!(q.pop_due(10.0).is_empty());
    }
}
