//! Bounded, directional back/forward history.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use tracing::trace;

use super::animator::Direction;

// ============================================================================
// Types
// ============================================================================

/// One history slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Full URL navigated to.
    pub url: String,
    /// Direction the frame entered the viewport from when recorded.
    pub from: Direction,
}

/// Read-only snapshot of the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    /// Records, oldest first.
    pub records: Vec<HistoryRecord>,
    /// Cursor into `records`; `None` before the first push.
    pub index: Option<usize>,
}

impl HistoryView {
    /// Number of records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was recorded yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// URLs, oldest first.
    #[must_use]
    pub fn urls(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.url.as_str()).collect()
    }

    /// Record under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryRecord> {
        self.index.and_then(|i| self.records.get(i))
    }
}

/// Where a back/forward traversal goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Traversal {
    /// Cursor after the traversal.
    pub index: usize,
    /// URL to replay.
    pub url: String,
    /// Direction to replay with.
    pub direction: Direction,
}

// ============================================================================
// HistoryStack
// ============================================================================

/// Ordered records plus a cursor.
///
/// Length never exceeds the capacity; the cursor, once set, always points
/// at a record.
#[derive(Debug, Clone)]
pub(crate) struct HistoryStack {
    records: VecDeque<HistoryRecord>,
    index: Option<usize>,
    max: usize,
}

impl HistoryStack {
    /// Creates an empty stack holding at most `max` records (`max >= 1`).
    pub fn new(max: usize) -> Self {
        Self {
            records: VecDeque::new(),
            index: None,
            max: max.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Record right before the cursor has exactly this URL.
    pub fn is_previous_state(&self, url: &str) -> bool {
        self.index
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.records.get(i))
            .is_some_and(|r| r.url == url)
    }

    /// Record right after the cursor has exactly this URL.
    pub fn is_next_state(&self, url: &str) -> bool {
        self.index
            .and_then(|i| self.records.get(i + 1))
            .is_some_and(|r| r.url == url)
    }

    pub fn at_first_slot(&self) -> bool {
        self.index.is_none_or(|i| i == 0)
    }

    pub fn at_last_slot(&self) -> bool {
        self.index.is_none_or(|i| i + 1 >= self.records.len())
    }

    /// Wipes the future, appends a record and moves the cursor onto it.
    ///
    /// When over capacity the oldest record goes and the cursor stays put,
    /// which already points at the new last slot after the shift.
    pub fn push_state(&mut self, url: impl Into<String>, from: Direction) {
        let keep = self.index.map_or(0, |i| i + 1);
        self.records.truncate(keep);

        self.records.push_back(HistoryRecord {
            url: url.into(),
            from,
        });

        if self.records.len() > self.max {
            self.records.pop_front();
        } else {
            self.index = Some(self.index.map_or(0, |i| i + 1));
        }

        trace!(index = ?self.index, len = self.records.len(), "Push state");
    }

    /// Target of a back traversal, undoing the current record's slide.
    pub fn back_target(&self) -> Option<Traversal> {
        if self.at_first_slot() {
            return None;
        }
        let index = self.index?;
        let current = self.records.get(index)?;
        let record = self.records.get(index - 1)?;

        Some(Traversal {
            index: index - 1,
            url: record.url.clone(),
            direction: current.from.inverse(),
        })
    }

    /// Target of a forward traversal, replaying the record's own slide.
    pub fn forward_target(&self) -> Option<Traversal> {
        if self.at_last_slot() {
            return None;
        }
        let index = self.index? + 1;
        let record = self.records.get(index)?;

        Some(Traversal {
            index,
            url: record.url.clone(),
            direction: record.from,
        })
    }

    /// Commits a traversal's cursor.
    pub fn set_index(&mut self, index: usize) {
        if index < self.records.len() {
            self.index = Some(index);
        }
    }

    pub fn view(&self) -> HistoryView {
        HistoryView {
            records: self.records.iter().cloned().collect(),
            index: self.index,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
