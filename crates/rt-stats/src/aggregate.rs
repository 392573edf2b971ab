//! Grouping logs by outcome.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use rt_core::{Event, Log, Outcome, OutcomeId, OutcomeRef, Scope};

/// Which outcome attribute logs are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBy {
    /// Group by outcome identifier.
    #[default]
    Id,
    /// Group by outcome name, as spelled in the event definition.
    Name,
}

/// The key a group of logs is counted under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKey {
    /// An outcome identifier.
    Id(OutcomeId),
    /// An outcome name.
    Name(String),
}

impl OutcomeKey {
    /// The key an outcome of the event is grouped under.
    pub fn of(outcome: &Outcome, key_by: KeyBy) -> Self {
        match key_by {
            KeyBy::Id => Self::Id(outcome.id),
            KeyBy::Name => Self::Name(outcome.name.clone()),
        }
    }

    fn raw(outcome: &OutcomeRef) -> Self {
        match outcome {
            OutcomeRef::Id(id) => Self::Id(*id),
            OutcomeRef::Name(name) => Self::Name(name.clone()),
        }
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "outcome {id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Per-outcome counts for one scope of one event.
///
/// Outcomes with no logs are absent; read them through
/// [`OutcomeCounts::count_for`] to get an implicit zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Counts for references that resolve in the event's outcome set.
    pub resolved: BTreeMap<OutcomeKey, u64>,
    /// Counts for references to outcomes the event no longer defines,
    /// keyed by the raw reference.
    pub unresolved: BTreeMap<OutcomeKey, u64>,
}

impl OutcomeCounts {
    /// Every admitted log, resolved or not.
    pub fn total(&self) -> u64 {
        self.resolved.values().sum::<u64>() + self.unresolved_total()
    }

    /// Logs whose outcome could not be resolved.
    pub fn unresolved_total(&self) -> u64 {
        self.unresolved.values().sum()
    }

    /// Count for a key, zero if absent.
    pub fn get(&self, key: &OutcomeKey) -> u64 {
        self.resolved.get(key).copied().unwrap_or(0)
    }

    /// Count for an outcome of the event, whichever way the logs were keyed.
    pub fn count_for(&self, outcome: &Outcome) -> u64 {
        self.get(&OutcomeKey::Id(outcome.id)) + self.get(&OutcomeKey::Name(outcome.name.clone()))
    }

    /// Whether no logs were admitted.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.unresolved.is_empty()
    }
}

/// Count the logs of `event` that `scope` admits, grouped by outcome.
///
/// Logs for other events are skipped. References that no longer resolve in
/// the event's outcome set are still counted, under their raw key in
/// [`OutcomeCounts::unresolved`].
pub fn aggregate<'a, I>(logs: I, event: &Event, scope: &Scope, key_by: KeyBy) -> OutcomeCounts
where
    I: IntoIterator<Item = &'a Log>,
{
    let mut counts = OutcomeCounts::default();
    for log in logs {
        if !scope.admits_for(event.id, log) {
            continue;
        }
        match event.resolve(&log.outcome) {
            Some(outcome) => {
                *counts
                    .resolved
                    .entry(OutcomeKey::of(outcome, key_by))
                    .or_default() += 1;
            }
            None => {
                *counts
                    .unresolved
                    .entry(OutcomeKey::raw(&log.outcome))
                    .or_default() += 1;
            }
        }
    }
    tracing::trace!(
        event = %event.id,
        %scope,
        total = counts.total(),
        unresolved = counts.unresolved_total(),
        "aggregated logs"
    );
    counts
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use rt_core::{EventId, GameId, LogId, Probability, UserId};

    use super::*;

    fn event() -> Event {
        let mut event = Event::new(EventId(1), GameId(1), "Rare Drop");
        for (id, name, p) in [(1, "Success", 0.05), (2, "Failure", 0.95)] {
            event.outcomes.push(Outcome {
                id: OutcomeId(id),
                event_id: EventId(1),
                name: name.to_string(),
                expected: Probability::new(p).unwrap(),
            });
        }
        event
    }

    fn log(outcome: OutcomeRef, user: u64, imported: bool) -> Log {
        Log {
            id: LogId(0),
            event_id: EventId(1),
            outcome,
            user_id: UserId(user),
            timestamp: Utc::now(),
            is_imported: imported,
        }
    }

    fn success(user: u64, imported: bool) -> Log {
        log(OutcomeRef::Id(OutcomeId(1)), user, imported)
    }

    #[test]
    fn organic_excludes_imported_but_personal_keeps_it() {
        let event = event();
        let logs = vec![success(1, false), success(1, true)];

        let global = aggregate(&logs, &event, &Scope::GlobalOrganic, KeyBy::Id);
        assert_eq!(global.get(&OutcomeKey::Id(OutcomeId(1))), 1);

        let personal = aggregate(&logs, &event, &Scope::Personal(UserId(1)), KeyBy::Id);
        assert_eq!(personal.get(&OutcomeKey::Id(OutcomeId(1))), 2);
    }

    #[test]
    fn unseen_outcomes_are_absent() {
        let event = event();
        let counts = aggregate(&[success(1, false)], &event, &Scope::GlobalAll, KeyBy::Id);
        assert!(!counts.resolved.contains_key(&OutcomeKey::Id(OutcomeId(2))));
        assert_eq!(counts.count_for(&event.outcomes[1]), 0);
    }

    #[test]
    fn key_by_name_uses_defined_spelling() {
        let event = event();
        let logs = vec![
            log(OutcomeRef::Name("success".into()), 1, false),
            success(2, false),
        ];
        let counts = aggregate(&logs, &event, &Scope::GlobalAll, KeyBy::Name);
        assert_eq!(counts.get(&OutcomeKey::Name("Success".into())), 2);
        assert_eq!(counts.count_for(&event.outcomes[0]), 2);
    }

    #[test]
    fn dangling_reference_counts_without_classification() {
        let event = event();
        let logs = vec![success(1, false), log(OutcomeRef::Id(OutcomeId(99)), 1, false)];
        let counts = aggregate(&logs, &event, &Scope::GlobalAll, KeyBy::Id);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.unresolved_total(), 1);
        assert_eq!(counts.unresolved[&OutcomeKey::Id(OutcomeId(99))], 1);
    }

    #[test]
    fn other_events_are_skipped() {
        let event = event();
        let mut stray = success(1, false);
        stray.event_id = EventId(2);
        let counts = aggregate(&[stray], &event, &Scope::GlobalAll, KeyBy::Id);
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
    }

    fn arb_log() -> impl Strategy<Value = Log> {
        (1u64..=3, 1u64..=3, any::<bool>()).prop_map(|(outcome, user, imported)| {
            log(OutcomeRef::Id(OutcomeId(outcome)), user, imported)
        })
    }

    proptest! {
        #[test]
        fn counts_sum_to_total(logs in prop::collection::vec(arb_log(), 0..200)) {
            let event = event();
            for scope in [
                Scope::GlobalOrganic,
                Scope::GlobalAll,
                Scope::Personal(UserId(1)),
            ] {
                let counts = aggregate(&logs, &event, &scope, KeyBy::Id);
                let summed: u64 = counts
                    .resolved
                    .values()
                    .chain(counts.unresolved.values())
                    .sum();
                prop_assert_eq!(summed, counts.total());
                let admitted = logs.iter().filter(|l| scope.admits(l)).count() as u64;
                prop_assert_eq!(counts.total(), admitted);
            }
        }

        #[test]
        fn scopes_nest(logs in prop::collection::vec(arb_log(), 0..200)) {
            let event = event();
            let all = aggregate(&logs, &event, &Scope::GlobalAll, KeyBy::Id).total();
            let organic = aggregate(&logs, &event, &Scope::GlobalOrganic, KeyBy::Id).total();
            let personal = aggregate(&logs, &event, &Scope::Personal(UserId(2)), KeyBy::Id).total();
            prop_assert!(organic <= all);
            prop_assert!(personal <= all);
        }
    }
}
