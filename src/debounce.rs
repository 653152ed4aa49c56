//! Per-field delay coalescing for autosave.
//!
//! Every edit replaces the pending value of its field and issues a new
//! ticket. The timer started for an older ticket finds it stale and does
//! nothing, so only the last edit after a quiet period is written. Blur and
//! teardown flush immediately.

use std::collections::HashMap;
use std::hash::Hash;

/// Identifies one scheduled write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Pending<V> {
    value: V,
    ticket: Ticket,
}

#[derive(Debug)]
pub struct PendingEdits<K, V> {
    slots: HashMap<K, Pending<V>>,
    next_ticket: u64,
}

impl<K: Eq + Hash + Clone, V> PendingEdits<K, V> {
    pub fn new() -> Self {
        PendingEdits {
            slots: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Record an edit; the returned ticket is the only one that can expire it
    pub fn edit(&mut self, field: K, value: V) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.slots.insert(field, Pending { value, ticket });
        ticket
    }

    /// The quiet period for `ticket` ended. Yields the value to write unless
    /// a newer edit or a flush got there first.
    pub fn expire(&mut self, field: &K, ticket: Ticket) -> Option<V> {
        match self.slots.get(field) {
            Some(pending) if pending.ticket == ticket => {
                self.slots.remove(field).map(|p| p.value)
            }
            _ => None,
        }
    }

    /// Take the pending value now (blur)
    pub fn flush(&mut self, field: &K) -> Option<V> {
        self.slots.remove(field).map(|p| p.value)
    }

    /// Take every pending value (teardown)
    pub fn flush_all(&mut self) -> Vec<(K, V)> {
        self.slots.drain().map(|(k, p)| (k, p.value)).collect()
    }
}

impl<K: Eq + Hash + Clone, V> Default for PendingEdits<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
