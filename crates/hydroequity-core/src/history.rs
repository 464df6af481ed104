//! Bounded rolling history of per-tick equity records.

use std::collections::VecDeque;

use hydroequity_types::HistoryRecord;

/// FIFO of the most recent [`HistoryRecord`]s.
///
/// Pushing beyond capacity drops the oldest record.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingHistory {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl RollingHistory {
    /// Create an empty history. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn push(&mut self, record: HistoryRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// All records, oldest first.
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.iter().copied().collect()
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.back()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of stored records.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
