//! Statistics and deviation engine for rngtrack.
//!
//! Turns raw observation logs into observed rates and compares them with
//! each outcome's expected probability:
//! - **Aggregate**: group the logs a [`Scope`](rt_core::Scope) admits by outcome
//! - **Rates**: actual rate, expected rate, and signed deviation per outcome
//! - **Assemble**: global and personal blocks in one [`StatsResponse`]
//!
//! Everything here is a pure function of the logs passed in. Nothing is
//! cached between calls.

pub mod aggregate;
pub mod assemble;
pub mod engine;
pub mod rates;

pub use aggregate::{KeyBy, OutcomeCounts, OutcomeKey, aggregate};
pub use assemble::{StatsResponse, assemble};
pub use engine::{StatsEngine, StatsOptions};
pub use rates::{BinaryRates, DECIMALS, OutcomeRate, compute, compute_binary};
