use std::collections::VecDeque;

use common::SignalHistoryEntry;

/// Append-only scan log that keeps only the most recent `capacity` entries.
#[derive(Debug, Clone)]
pub struct SignalHistory {
    entries: VecDeque<SignalHistoryEntry>,
    capacity: usize,
}

impl SignalHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "history capacity must be >= 1");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one entry, evicting the oldest when full.
    pub fn push(&mut self, entry: SignalHistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = SignalHistoryEntry>) {
        for entry in entries {
            self.push(entry);
        }
    }

    /// At most `limit` of the newest entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<SignalHistoryEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
