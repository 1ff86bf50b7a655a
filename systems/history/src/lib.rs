#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Audit records for completed command runs and the log that keeps them.
//!
//! A [`HistoryRecord`] pairs the raw command string with its optimized
//! encoding, the moment the run completed, and the sample snapshots taken
//! before and after the run. Records are immutable once built. The
//! [`HistoryLog`] keeps them newest first and never evicts or edits them.

use manipulator_core::SamplesSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Errors raised while serializing history for display or export.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The record or snapshot could not be encoded as JSON.
    #[error("failed to encode history as JSON")]
    Encode(#[from] serde_json::Error),
    /// The completion timestamp could not be rendered.
    #[error("failed to format history timestamp")]
    Timestamp(#[from] time::error::Format),
}

/// Immutable audit entry describing one completed run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    original_command: String,
    optimized_command: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    initial_state: SamplesSnapshot,
    final_state: SamplesSnapshot,
}

impl HistoryRecord {
    /// Builds a record from the materials produced by a run.
    #[must_use]
    pub fn new(
        original_command: impl Into<String>,
        optimized_command: impl Into<String>,
        timestamp: OffsetDateTime,
        initial_state: SamplesSnapshot,
        final_state: SamplesSnapshot,
    ) -> Self {
        Self {
            original_command: original_command.into(),
            optimized_command: optimized_command.into(),
            timestamp,
            initial_state,
            final_state,
        }
    }

    /// Command string exactly as the operator entered it.
    #[must_use]
    pub fn original_command(&self) -> &str {
        &self.original_command
    }

    /// Compressed encoding of the original command string.
    #[must_use]
    pub fn optimized_command(&self) -> &str {
        &self.optimized_command
    }

    /// Moment the run completed.
    #[must_use]
    pub const fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// Samples before the run's first command.
    #[must_use]
    pub const fn initial_state(&self) -> &SamplesSnapshot {
        &self.initial_state
    }

    /// Samples after the run's last command.
    #[must_use]
    pub const fn final_state(&self) -> &SamplesSnapshot {
        &self.final_state
    }

    /// Compact JSON text of the initial sample snapshot.
    pub fn initial_state_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.initial_state)?)
    }

    /// Compact JSON text of the final sample snapshot.
    pub fn final_state_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.final_state)?)
    }

    /// ISO-8601 rendering of the completion timestamp.
    pub fn timestamp_rfc3339(&self) -> Result<String, HistoryError> {
        Ok(self.timestamp.format(&Rfc3339)?)
    }
}

/// Destination for completed run records.
pub trait HistoryRecorder {
    /// Stores a newly completed record.
    fn record(&mut self, record: HistoryRecord);
}

/// Unbounded append-only log that lists the most recent record first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Iterator over records, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    /// Most recently recorded entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.first()
    }

    /// Number of recorded runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether no run has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pretty-printed JSON array of every record, newest first.
    pub fn to_json_pretty(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl HistoryRecorder for HistoryLog {
    fn record(&mut self, record: HistoryRecord) {
        self.records.insert(0, record);
    }
}
