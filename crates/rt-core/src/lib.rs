//! Core types for rngtrack: games, events, outcomes, and observation logs.
//!
//! This crate defines the data model the statistics engine reads from. It
//! also ships the [`Ledger`], a JSON-backed store that implements the
//! [`LogSource`] contract, and a migration path from the legacy
//! aggregate-probability schema.

/// Error types used throughout the crate.
pub mod error;
/// Events, their outcomes, and expected probabilities.
pub mod event;
/// Games that group events together.
pub mod game;
/// Sequential identifiers for every stored record.
pub mod id;
/// The file-backed store of games, events, and logs.
pub mod ledger;
/// Observation records and bulk log entries.
pub mod log;
/// Conversion from the legacy single-probability schema.
pub mod migrate;
/// Probability values and the percent/fraction normalizer.
pub mod probability;
/// Aggregation scopes and caller identity.
pub mod scope;
/// The read contract the statistics engine consumes.
pub mod source;

/// Re-export error types.
pub use error::{TrackError, TrackResult};
/// Re-export event types.
pub use event::{Event, NewOutcome, Outcome};
/// Re-export game types.
pub use game::Game;
/// Re-export identifier types.
pub use id::{EventId, GameId, LogId, OutcomeId, UserId};
/// Re-export the ledger.
pub use ledger::Ledger;
/// Re-export log types.
pub use log::{Log, LogEntry, MAX_BULK_COUNT, OutcomeRef};
/// Re-export probability types.
pub use probability::{Probability, ProbabilityUnit, normalize};
/// Re-export scope types.
pub use scope::{CallerContext, GlobalScope, Scope};
/// Re-export the persistence contract.
pub use source::LogSource;
