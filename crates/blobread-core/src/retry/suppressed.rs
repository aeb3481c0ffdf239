//! Bounded history of retryable failures attached to terminal errors.

use crate::stream::SourceError;
use std::fmt;

/// Capacity of a session's suppressed-failure history.
pub const MAX_SUPPRESSED_FAILURES: usize = 10;

/// A retryable failure and where it happened.
#[derive(Debug)]
pub struct FailureRecord {
    pub error: SourceError,
    /// Bytes delivered (relative to the range start) when the failure occurred.
    pub offset: u64,
    /// Attempt number (1-based) that failed.
    pub attempt: u32,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempt {} at offset {}: {}",
            self.attempt, self.offset, self.error
        )
    }
}

/// Oldest-first list of at most [`MAX_SUPPRESSED_FAILURES`] records.
///
/// Records pushed once the list is full are dropped without a trace; no
/// count of dropped entries is kept.
#[derive(Debug, Default)]
pub struct SuppressedFailures {
    records: Vec<FailureRecord>,
}

impl SuppressedFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` if capacity remains. Returns whether it was kept.
    pub fn push(&mut self, record: FailureRecord) -> bool {
        if self.records.len() >= MAX_SUPPRESSED_FAILURES {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FailureRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a SuppressedFailures {
    type Item = &'a FailureRecord;
    type IntoIter = std::slice::Iter<'a, FailureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
