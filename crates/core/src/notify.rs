//! Transient toast notifications.

use serde::Serialize;

use crate::timer::{TimerId, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub kind: NotificationKind,
    /// Milliseconds left before auto-dismissal.
    pub remaining_ms: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    id: u64,
    text: String,
    kind: NotificationKind,
    expires: TimerId,
}

/// Bounded toast stack. Oldest entries are dropped first when full.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    lifetime_ms: u64,
    capacity: usize,
    next_id: u64,
    entries: Vec<Entry>,
    timers: TimerQueue<u64>,
}

impl NotificationQueue {
    pub fn new(lifetime_ms: u64, capacity: usize) -> Self {
        Self {
            lifetime_ms,
            capacity: capacity.max(1),
            next_id: 1,
            entries: Vec::new(),
            timers: TimerQueue::new(),
        }
    }

    pub fn push(&mut self, text: impl Into<String>, kind: NotificationKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let expires = self.timers.schedule(self.lifetime_ms, id);
        self.entries.push(Entry {
            id,
            text: text.into(),
            kind,
            expires,
        });
        while self.entries.len() > self.capacity {
            let dropped = self.entries.remove(0);
            self.timers.cancel(dropped.expires);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(pos);
        self.timers.cancel(entry.expires);
        true
    }

    pub fn advance(&mut self, dt_ms: u64) {
        for (_, id) in self.timers.advance(dt_ms) {
            self.entries.retain(|e| e.id != id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visible toasts, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.entries
            .iter()
            .map(|e| Notification {
                id: e.id,
                text: e.text.clone(),
                kind: e.kind,
                remaining_ms: self.timers.remaining_ms(e.expires).unwrap_or(0),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_lifetime() {
        let mut q = NotificationQueue::new(3000, 5);
        q.push("You found Thor!", NotificationKind::Success);
        q.advance(2999);
        assert_eq!(q.len(), 1);
        assert_eq!(q.active()[0].remaining_ms, 1);
        q.advance(1);
        assert!(q.is_empty());
    }

    #[test]
    fn oldest_dropped_past_capacity() {
        let mut q = NotificationQueue::new(3000, 2);
        q.push("a", NotificationKind::Info);
        q.push("b", NotificationKind::Info);
        q.push("c", NotificationKind::Info);
        let texts: Vec<_> = q.active().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn dismiss_removes_early() {
        let mut q = NotificationQueue::new(3000, 5);
        let id = q.push("a", NotificationKind::Warning);
        assert!(q.dismiss(id));
        assert!(!q.dismiss(id));
        assert!(q.is_empty());
    }
}
