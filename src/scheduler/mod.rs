//! Timer Queue
//!
//! Virtual-time scheduler for the dashboard. Every delayed callback on the
//! page (counter ticks, the analyze completion) is an entry in a
//! [`TimerQueue`], so the whole timeline can be driven deterministically in
//! tests or replayed against the wall clock.
//!
//! # Ordering
//!
//! Timers fire in deadline order. Timers sharing a deadline fire in the order
//! they were scheduled.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle to a scheduled timer, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Virtual-time timer queue carrying event payloads of type `E`
#[derive(Debug)]
pub struct TimerQueue<E> {
    /// Current virtual time in milliseconds
    now: u64,
    /// Next timer sequence number
    next_seq: u64,
    /// Min-heap of (deadline, sequence)
    heap: BinaryHeap<Reverse<(u64, u64)>>,
    /// Live payloads by sequence; cancelled timers are absent
    payloads: HashMap<u64, E>,
}

impl<E> TimerQueue<E> {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            heap: BinaryHeap::new(),
            payloads: HashMap::new(),
        }
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `event` to fire `delay_ms` after the current time
    pub fn schedule(&mut self, delay_ms: u64, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;

        let deadline = self.now.saturating_add(delay_ms);
        self.heap.push(Reverse((deadline, seq)));
        self.payloads.insert(seq, event);

        TimerId(seq)
    }

    /// Cancel a pending timer
    ///
    /// Returns `false` if the timer already fired or was already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.payloads.remove(&id.0).is_some()
    }

    /// Whether a timer is still waiting to fire
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.payloads.contains_key(&id.0)
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.payloads.len()
    }

    /// Whether no timers are waiting
    pub fn is_idle(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Deadline of the earliest live timer
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.discard_cancelled();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pop the earliest timer due at or before `until`
    ///
    /// Virtual time moves forward to the popped timer's deadline.
    pub fn pop_due(&mut self, until: u64) -> Option<(u64, E)> {
        self.discard_cancelled();

        let Reverse((deadline, seq)) = *self.heap.peek()?;
        if deadline > until {
            return None;
        }
        self.heap.pop();

        let event = self.payloads.remove(&seq)?;
        self.now = self.now.max(deadline);
        Some((deadline, event))
    }

    /// Move virtual time forward without firing anything
    ///
    /// Time never moves backwards.
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    /// Drop heap entries whose payload was cancelled
    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, seq))) = self.heap.peek() {
            if self.payloads.contains_key(seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
