use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EventId, LogId, OutcomeId, UserId};

/// How a log points at the outcome it observed.
///
/// Current rows use [`OutcomeRef::Id`]. Rows migrated from the legacy schema
/// may carry the outcome name instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeRef {
    /// Reference by outcome identifier.
    Id(OutcomeId),
    /// Reference by outcome name.
    Name(String),
}

impl fmt::Display for OutcomeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "outcome {id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// One recorded observation of an outcome. Never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// Unique identifier for this row.
    pub id: LogId,
    /// The event that was attempted.
    pub event_id: EventId,
    /// The outcome that occurred.
    pub outcome: OutcomeRef,
    /// The user who recorded the observation.
    pub user_id: UserId,
    /// When the observation was recorded.
    pub timestamp: DateTime<Utc>,
    /// True for backfilled history, false for observations logged live.
    ///
    /// Rows written before the flag existed deserialize as organic.
    #[serde(default)]
    pub is_imported: bool,
}

/// Most rows a single [`LogEntry`] may write.
pub const MAX_BULK_COUNT: u32 = 100_000;

/// A request to record one or more identical observations.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// The event that was attempted.
    pub event_id: EventId,
    /// The outcome that occurred.
    pub outcome: OutcomeRef,
    /// The user recording the observation.
    pub user_id: UserId,
    /// How many identical rows to write. Zero is treated as one, and more
    /// than [`MAX_BULK_COUNT`] is rejected.
    pub count: u32,
    /// Whether the rows are backfilled history.
    pub is_imported: bool,
}

impl LogEntry {
    /// A single organic observation.
    pub fn new(event_id: EventId, outcome: OutcomeRef, user_id: UserId) -> Self {
        Self {
            event_id,
            outcome,
            user_id,
            count: 1,
            is_imported: false,
        }
    }

    /// Record `count` identical rows.
    pub fn times(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Mark the rows as imported history.
    pub fn imported(mut self, imported: bool) -> Self {
        self.is_imported = imported;
        self
    }

    /// Number of rows this entry produces.
    pub fn row_count(&self) -> u32 {
        self.count.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_writes_one_row() {
        let entry = LogEntry::new(EventId(1), OutcomeRef::Id(OutcomeId(1)), UserId(1)).times(0);
        assert_eq!(entry.row_count(), 1);
    }

    #[test]
    fn missing_imported_flag_defaults_to_organic() {
        let json = r#"{
            "id": 1,
            "event_id": 2,
            "outcome": {"id": 3},
            "user_id": 4,
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;
        let log: Log = serde_json::from_str(json).unwrap();
        assert!(!log.is_imported);
        assert_eq!(log.outcome, OutcomeRef::Id(OutcomeId(3)));
    }

    #[test]
    fn name_reference_round_trips() {
        let r = OutcomeRef::Name("Success".into());
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"name":"Success"}"#);
    }
}
