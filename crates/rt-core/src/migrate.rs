//! Migration from the legacy aggregate-probability schema.
//!
//! Older trackers stored one success probability per event (entered as a
//! percentage) and flagged each outcome as success or failure. The canonical
//! schema stores an expected probability per outcome, so a legacy event
//! becomes a binary event with a `Success` outcome at `p` and a `Failure`
//! outcome at `1 - p`. Each legacy log is routed to one of the two by the
//! `is_success` flag of the outcome it named.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackError, TrackResult};
use crate::event::NewOutcome;
use crate::id::{EventId, GameId, UserId};
use crate::ledger::Ledger;
use crate::log::{Log, OutcomeRef};
use crate::probability::{ProbabilityUnit, normalize};

/// Name of the outcome success-flagged legacy outcomes map to.
pub const SUCCESS: &str = "Success";
/// Name of the outcome all other legacy outcomes map to.
pub const FAILURE: &str = "Failure";

/// A legacy outcome: a name and a success flag, no probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOutcome {
    /// Display name.
    pub name: String,
    /// Whether observing this outcome counts as a success.
    pub is_success: bool,
}

/// A legacy log row, referencing its outcome by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyLog {
    /// Name of the observed outcome.
    pub outcome_name: String,
    /// The recording user.
    pub user_id: UserId,
    /// When the observation was recorded. Defaults to the migration time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the row was backfilled. Absent in the oldest exports.
    #[serde(default)]
    pub is_imported: bool,
}

/// A legacy event with its single aggregate success probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyEvent {
    /// Display name.
    pub name: String,
    /// Success probability, in the unit given by `unit`.
    pub probability: f64,
    /// How `probability` is expressed. Legacy data used percentages.
    #[serde(default)]
    pub unit: ProbabilityUnit,
    /// The outcomes and their success flags.
    pub outcomes: Vec<LegacyOutcome>,
    /// The observations.
    #[serde(default)]
    pub logs: Vec<LegacyLog>,
}

/// What a migration wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// The newly created canonical event.
    pub event: EventId,
    /// Logs mapped to the success outcome.
    pub successes: usize,
    /// Logs mapped to the failure outcome.
    pub failures: usize,
}

/// Convert a legacy event into a binary canonical event inside the ledger.
///
/// Logs naming an outcome the legacy event does not define are rejected,
/// and nothing is written in that case.
pub fn migrate_event(
    ledger: &mut Ledger,
    game: GameId,
    legacy: &LegacyEvent,
) -> TrackResult<MigrationReport> {
    let success_p = normalize(legacy.probability, legacy.unit)?;

    let mut routed = Vec::with_capacity(legacy.logs.len());
    for log in &legacy.logs {
        let outcome = legacy
            .outcomes
            .iter()
            .find(|o| o.name.to_lowercase() == log.outcome_name.to_lowercase())
            .ok_or_else(|| TrackError::UnknownLegacyOutcome(log.outcome_name.clone()))?;
        routed.push((outcome.is_success, log));
    }

    let event = ledger
        .add_event(
            game,
            legacy.name.clone(),
            vec![
                NewOutcome::new(SUCCESS, success_p),
                NewOutcome::new(FAILURE, success_p.complement()),
            ],
        )?
        .clone();
    let success_id = event.outcomes[0].id;
    let failure_id = event.outcomes[1].id;

    let now = Utc::now();
    let mut report = MigrationReport {
        event: event.id,
        successes: 0,
        failures: 0,
    };
    for (is_success, log) in routed {
        let outcome = if is_success {
            report.successes += 1;
            success_id
        } else {
            report.failures += 1;
            failure_id
        };
        let id = ledger.next_log_id();
        ledger.push_log(Log {
            id,
            event_id: event.id,
            outcome: OutcomeRef::Id(outcome),
            user_id: log.user_id,
            timestamp: log.timestamp.unwrap_or(now),
            is_imported: log.is_imported,
        });
    }

    tracing::info!(
        event = %event.id,
        name = %event.name,
        successes = report.successes,
        failures = report.failures,
        "migrated legacy event"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use crate::source::LogSource;

    fn legacy() -> LegacyEvent {
        LegacyEvent {
            name: "Boss Chest".into(),
            probability: 42.0,
            unit: ProbabilityUnit::Percent,
            outcomes: vec![
                LegacyOutcome {
                    name: "Legendary".into(),
                    is_success: true,
                },
                LegacyOutcome {
                    name: "Junk".into(),
                    is_success: false,
                },
                LegacyOutcome {
                    name: "Nothing".into(),
                    is_success: false,
                },
            ],
            logs: vec![
                LegacyLog {
                    outcome_name: "Legendary".into(),
                    user_id: UserId(1),
                    timestamp: None,
                    is_imported: false,
                },
                LegacyLog {
                    outcome_name: "junk".into(),
                    user_id: UserId(1),
                    timestamp: None,
                    is_imported: false,
                },
                LegacyLog {
                    outcome_name: "Nothing".into(),
                    user_id: UserId(2),
                    timestamp: None,
                    is_imported: true,
                },
            ],
        }
    }

    #[test]
    fn aggregate_probability_becomes_binary_outcomes() {
        let mut ledger = Ledger::new();
        let game = ledger.add_game("G", None).id;
        let report = migrate_event(&mut ledger, game, &legacy()).unwrap();

        let event = ledger.event(report.event).unwrap();
        assert_eq!(event.outcomes.len(), 2);
        assert_eq!(event.outcomes[0].name, SUCCESS);
        assert!((event.outcomes[0].expected.value() - 0.42).abs() < 1e-12);
        assert!((event.outcomes[1].expected.value() - 0.58).abs() < 1e-12);
    }

    #[test]
    fn logs_route_by_success_flag() {
        let mut ledger = Ledger::new();
        let game = ledger.add_game("G", None).id;
        let report = migrate_event(&mut ledger, game, &legacy()).unwrap();
        assert_eq!(report.successes, 1);
        assert_eq!(report.failures, 2);

        let organic = ledger.fetch_logs(report.event, &Scope::GlobalOrganic).unwrap();
        assert_eq!(organic.len(), 2);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut ledger = Ledger::new();
        let game = ledger.add_game("G", None).id;
        let mut bad = legacy();
        bad.probability = 142.0;
        assert!(matches!(
            migrate_event(&mut ledger, game, &bad),
            Err(TrackError::InvalidScopeInput { .. })
        ));
        assert_eq!(ledger.event_count(), 0);
    }

    #[test]
    fn unknown_outcome_name_writes_nothing() {
        let mut ledger = Ledger::new();
        let game = ledger.add_game("G", None).id;
        let mut bad = legacy();
        bad.logs[0].outcome_name = "Mythic".into();
        assert!(matches!(
            migrate_event(&mut ledger, game, &bad),
            Err(TrackError::UnknownLegacyOutcome(name)) if name == "Mythic"
        ));
        assert_eq!(ledger.event_count(), 0);
        assert_eq!(ledger.log_count(), 0);
    }

    #[test]
    fn legacy_json_without_unit_reads_as_percent() {
        let json = r#"{
            "name": "Drop",
            "probability": 5,
            "outcomes": [{"name": "Hit", "is_success": true}]
        }"#;
        let event: LegacyEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.unit, ProbabilityUnit::Percent);
        assert!(event.logs.is_empty());
    }
}
