use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EventId, GameId, OutcomeId};
use crate::log::OutcomeRef;
use crate::probability::Probability;

/// A possible result of an event, with the chance it is expected to occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Unique identifier for this outcome.
    pub id: OutcomeId,
    /// The event this outcome belongs to.
    pub event_id: EventId,
    /// Display name. Unique within the event, ignoring case.
    pub name: String,
    /// Expected probability of this outcome on a single attempt.
    pub expected: Probability,
}

/// An outcome that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutcome {
    /// Display name of the outcome.
    pub name: String,
    /// Expected probability, already normalized.
    pub expected: Probability,
}

impl NewOutcome {
    /// Create an outcome definition.
    pub fn new(name: impl Into<String>, expected: Probability) -> Self {
        Self {
            name: name.into(),
            expected,
        }
    }
}

/// A trackable random occurrence, such as a boss drop or a gacha pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    pub id: EventId,
    /// The game this event belongs to.
    pub game_id: GameId,
    /// Display name of the event.
    pub name: String,
    /// The possible outcomes. Order carries no meaning.
    pub outcomes: Vec<Outcome>,
    /// Timestamp when the event was defined.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create an event with no outcomes.
    pub fn new(id: EventId, game_id: GameId, name: impl Into<String>) -> Self {
        Self {
            id,
            game_id,
            name: name.into(),
            outcomes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Find an outcome by ID.
    pub fn outcome(&self, id: OutcomeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    /// Find an outcome by name (case-insensitive).
    pub fn outcome_by_name(&self, name: &str) -> Option<&Outcome> {
        let name_lower = name.to_lowercase();
        self.outcomes
            .iter()
            .find(|o| o.name.to_lowercase() == name_lower)
    }

    /// Resolve a log's outcome reference against the current outcome set.
    ///
    /// Returns `None` for references to outcomes this event no longer
    /// defines.
    pub fn resolve(&self, outcome: &OutcomeRef) -> Option<&Outcome> {
        match outcome {
            OutcomeRef::Id(id) => self.outcome(*id),
            OutcomeRef::Name(name) => self.outcome_by_name(name),
        }
    }

    /// Sum of all expected probabilities. Close to 1 for a well-formed event.
    pub fn expected_total(&self) -> f64 {
        self.outcomes.iter().map(|o| o.expected.value()).sum()
    }
}
