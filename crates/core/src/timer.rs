//! Virtual-time timer queue.
//!
//! The engine never reads a clock. Hosts feed elapsed milliseconds into
//! [`TimerQueue::advance`], and tests do the same with exact values.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_seq: u64,
    /// Keyed by (due time, scheduling sequence): ties fire in scheduling order.
    pending: BTreeMap<(u64, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.pending.insert((due, seq), payload);
        TimerId(seq)
    }

    /// Cancel a pending timer; returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.pending.keys().find(|(_, seq)| *seq == id.0).copied()?;
        self.pending.remove(&key)
    }

    /// Cancel every pending timer whose payload matches.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, payload| !pred(payload));
        before - self.pending.len()
    }

    /// Remaining delay of a pending timer.
    pub fn remaining_ms(&self, id: TimerId) -> Option<u64> {
        self.pending
            .keys()
            .find(|(_, seq)| *seq == id.0)
            .map(|(due, _)| due.saturating_sub(self.now_ms))
    }

    /// Absolute time `dt_ms` from now.
    pub fn deadline(&self, dt_ms: u64) -> u64 {
        self.now_ms.saturating_add(dt_ms)
    }

    /// Remove the earliest timer due at or before `until` and move the clock to
    /// its due time, so anything scheduled in reaction counts from there.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, T)> {
        let (&(due, seq), _) = self.pending.first_key_value()?;
        if due > until {
            return None;
        }
        let payload = self.pending.remove(&(due, seq))?;
        self.now_ms = self.now_ms.max(due);
        Some((TimerId(seq), payload))
    }

    /// Finish a `pop_due` loop: the clock lands on `until`.
    pub fn settle(&mut self, until: u64) {
        self.now_ms = self.now_ms.max(until);
    }

    /// Move time forward and return every payload that came due, in order.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<(TimerId, T)> {
        let until = self.deadline(dt_ms);
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(until) {
            fired.push(entry);
        }
        self.settle(until);
        fired
    }
}
