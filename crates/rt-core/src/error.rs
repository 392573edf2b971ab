use crate::id::{EventId, GameId};
use crate::probability::ProbabilityUnit;

/// Alias for `Result<T, TrackError>`.
pub type TrackResult<T> = Result<T, TrackError>;

/// Errors that can occur when reading or writing tracked data.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The requested event ID does not exist.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The requested game ID does not exist.
    #[error("game not found: {0}")]
    GameNotFound(GameId),

    /// A log referenced an outcome the event does not define.
    #[error("outcome \"{outcome}\" not found in event {event}")]
    OutcomeNotFound {
        /// The event that was searched.
        event: EventId,
        /// The outcome reference as given.
        outcome: String,
    },

    /// A probability fell outside the valid range for its unit.
    #[error("invalid probability {value} ({unit}): expected {}", .unit.range_label())]
    InvalidScopeInput {
        /// The raw value as supplied.
        value: f64,
        /// The unit the value was interpreted in.
        unit: ProbabilityUnit,
    },

    /// An outcome with the same name already exists in the event.
    #[error("outcome already exists: \"{0}\"")]
    DuplicateOutcome(String),

    /// An event was created without any outcomes.
    #[error("event \"{0}\" needs at least one outcome")]
    EmptyOutcomeSet(String),

    /// A legacy log named an outcome its event does not define.
    #[error("legacy log names unknown outcome \"{0}\"")]
    UnknownLegacyOutcome(String),

    /// A bulk log asked for more rows than a single entry may write.
    #[error("cannot log {requested} rows at once: the limit is {limit}")]
    BulkCountTooLarge {
        /// The requested row count.
        requested: u32,
        /// The largest accepted row count.
        limit: u32,
    },

    /// Reading or writing the ledger file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger file could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
