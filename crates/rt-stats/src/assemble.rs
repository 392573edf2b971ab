//! Combining global and personal figures into one response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rt_core::{Event, EventId, Probability, Scope, UserId};

use crate::aggregate::OutcomeCounts;
use crate::rates::{OutcomeRate, compute};

/// Stats for one event, ready to hand to a presentation layer.
///
/// Every map is keyed by outcome name and holds an entry for each outcome
/// the event defines. The `user_*` fields stay zero and empty for anonymous
/// callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// The event the stats describe.
    pub event_id: EventId,
    /// Display name of the event.
    pub event_name: String,
    /// Which logs fed the global block.
    pub global_scope: Scope,
    /// Logs in the global block, including unresolved ones.
    pub total_attempts: u64,
    /// Global hits per outcome.
    pub outcomes: BTreeMap<String, u64>,
    /// Expected rate per outcome, in percent.
    pub expected_rates: BTreeMap<String, f64>,
    /// Global observed rate per outcome, in percent.
    pub actual_rates: BTreeMap<String, f64>,
    /// Global deviation per outcome, in percentage points.
    pub deviation: BTreeMap<String, f64>,
    /// Whether each outcome came up more often than expected globally.
    pub above_expected: BTreeMap<String, bool>,
    /// Global hits the expected probabilities predict.
    pub expected_hits: BTreeMap<String, f64>,
    /// Global hits minus expected hits. Positive means luckier than expected.
    pub hit_deviation: BTreeMap<String, f64>,
    /// Global logs whose outcome the event no longer defines.
    pub unresolved: u64,
    /// The caller the personal block belongs to, if identified.
    pub user_id: Option<UserId>,
    /// Logs in the personal block.
    pub user_total_attempts: u64,
    /// Personal hits per outcome. Empty for anonymous callers.
    pub user_outcomes: BTreeMap<String, u64>,
    /// Personal observed rate per outcome, in percent.
    pub user_actual_rates: BTreeMap<String, f64>,
    /// Personal deviation per outcome, in percentage points.
    pub user_deviation: BTreeMap<String, f64>,
    /// Whether each outcome came up more often than expected for the caller.
    pub user_above_expected: BTreeMap<String, bool>,
    /// Hits the expected probabilities predict for the caller's attempts.
    pub user_expected_hits: BTreeMap<String, f64>,
    /// Personal hits minus personal expected hits.
    pub user_hit_deviation: BTreeMap<String, f64>,
    /// Personal logs whose outcome the event no longer defines.
    pub user_unresolved: u64,
}

impl StatsResponse {
    /// Whether a personal block was computed.
    pub fn has_personal(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Counts and rates for one scope, keyed by outcome name.
struct Block {
    total: u64,
    counts: BTreeMap<String, u64>,
    rates: BTreeMap<String, OutcomeRate>,
    unresolved: u64,
}

impl Block {
    fn new(event: &Event, counts: &OutcomeCounts) -> Self {
        let by_name: BTreeMap<String, u64> = event
            .outcomes
            .iter()
            .map(|o| (o.name.clone(), counts.count_for(o)))
            .collect();
        let expected: BTreeMap<String, Probability> = event
            .outcomes
            .iter()
            .map(|o| (o.name.clone(), o.expected))
            .collect();
        let total = counts.total();
        let rates = compute(&by_name, total, &expected);
        Self {
            total,
            counts: by_name,
            rates,
            unresolved: counts.unresolved_total(),
        }
    }

    fn project<T>(&self, f: impl Fn(&OutcomeRate) -> T) -> BTreeMap<String, T> {
        self.rates.iter().map(|(k, r)| (k.clone(), f(r))).collect()
    }
}

/// Build the response for an event.
///
/// `personal` carries the caller and their counts when the caller is
/// identified. A user with no logs gets a zero-valued personal block.
pub fn assemble(
    event: &Event,
    global_scope: Scope,
    global: &OutcomeCounts,
    personal: Option<(UserId, &OutcomeCounts)>,
) -> StatsResponse {
    let global_block = Block::new(event, global);

    let mut response = StatsResponse {
        event_id: event.id,
        event_name: event.name.clone(),
        global_scope,
        total_attempts: global_block.total,
        expected_rates: global_block.project(|r| r.expected_rate_pct),
        actual_rates: global_block.project(|r| r.actual_rate_pct),
        deviation: global_block.project(|r| r.deviation_pct),
        above_expected: global_block.project(OutcomeRate::is_above_expected),
        expected_hits: global_block.project(|r| r.expected_hits),
        hit_deviation: global_block.project(|r| r.hit_deviation),
        unresolved: global_block.unresolved,
        outcomes: global_block.counts,
        user_id: None,
        user_total_attempts: 0,
        user_outcomes: BTreeMap::new(),
        user_actual_rates: BTreeMap::new(),
        user_deviation: BTreeMap::new(),
        user_above_expected: BTreeMap::new(),
        user_expected_hits: BTreeMap::new(),
        user_hit_deviation: BTreeMap::new(),
        user_unresolved: 0,
    };

    if let Some((user, counts)) = personal {
        let block = Block::new(event, counts);
        response.user_id = Some(user);
        response.user_total_attempts = block.total;
        response.user_actual_rates = block.project(|r| r.actual_rate_pct);
        response.user_deviation = block.project(|r| r.deviation_pct);
        response.user_above_expected = block.project(OutcomeRate::is_above_expected);
        response.user_expected_hits = block.project(|r| r.expected_hits);
        response.user_hit_deviation = block.project(|r| r.hit_deviation);
        response.user_unresolved = block.unresolved;
        response.user_outcomes = block.counts;
    }

    response
}

#[cfg(test)]
mod tests {
    use rt_core::{GameId, Outcome, OutcomeId};

    use super::*;
    use crate::aggregate::OutcomeKey;

    fn rare_drop() -> Event {
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

    fn counts(success: u64, failure: u64) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        if success > 0 {
            counts.resolved.insert(OutcomeKey::Id(OutcomeId(1)), success);
        }
        if failure > 0 {
            counts.resolved.insert(OutcomeKey::Id(OutcomeId(2)), failure);
        }
        counts
    }

    #[test]
    fn anonymous_caller_gets_empty_personal_block() {
        let response = assemble(&rare_drop(), Scope::GlobalOrganic, &counts(12, 188), None);
        assert_eq!(response.event_name, "Rare Drop");
        assert_eq!(response.total_attempts, 200);
        assert_eq!(response.user_total_attempts, 0);
        assert!(response.user_outcomes.is_empty());
        assert!(response.user_actual_rates.is_empty());
        assert!(response.user_expected_hits.is_empty());
        assert!(response.user_hit_deviation.is_empty());
        assert!(!response.has_personal());
    }

    #[test]
    fn global_block_matches_rare_drop_scenario() {
        let response = assemble(&rare_drop(), Scope::GlobalOrganic, &counts(12, 188), None);
        assert_eq!(response.outcomes["Success"], 12);
        assert!((response.actual_rates["Success"] - 6.0).abs() < 1e-9);
        assert!((response.deviation["Success"] - 1.0).abs() < 1e-9);
        assert!(response.above_expected["Success"]);
        assert_eq!(response.expected_rates["Failure"], 95.0);
        assert_eq!(response.expected_hits["Success"], 10.0);
        assert_eq!(response.hit_deviation["Success"], 2.0);
        assert_eq!(response.hit_deviation["Failure"], -2.0);
    }

    #[test]
    fn personal_block_reports_expected_hits() {
        let response = assemble(
            &rare_drop(),
            Scope::GlobalOrganic,
            &counts(12, 188),
            Some((UserId(1), &counts(3, 17))),
        );
        assert_eq!(response.user_total_attempts, 20);
        assert_eq!(response.user_expected_hits["Success"], 1.0);
        assert_eq!(response.user_expected_hits["Failure"], 19.0);
        assert_eq!(response.user_hit_deviation["Success"], 2.0);
        assert_eq!(response.user_hit_deviation["Failure"], -2.0);
        assert!(response.user_above_expected["Success"]);
    }

    #[test]
    fn outcomes_are_default_filled() {
        let response = assemble(&rare_drop(), Scope::GlobalOrganic, &counts(0, 3), None);
        assert_eq!(response.outcomes["Success"], 0);
        assert_eq!(response.actual_rates["Success"], 0.0);
        assert_eq!(response.deviation["Success"], -5.0);
    }

    #[test]
    fn identified_user_without_logs_is_zero_not_error() {
        let empty = OutcomeCounts::default();
        let response = assemble(
            &rare_drop(),
            Scope::GlobalOrganic,
            &counts(1, 1),
            Some((UserId(4), &empty)),
        );
        assert!(response.has_personal());
        assert_eq!(response.user_total_attempts, 0);
        assert_eq!(response.user_outcomes["Success"], 0);
        assert_eq!(response.user_actual_rates["Success"], 0.0);
        assert_eq!(response.user_deviation["Failure"], -95.0);
    }

    #[test]
    fn unresolved_logs_count_toward_total_only() {
        let mut global = counts(1, 0);
        global.unresolved.insert(OutcomeKey::Id(OutcomeId(77)), 1);
        let response = assemble(&rare_drop(), Scope::GlobalAll, &global, None);
        assert_eq!(response.total_attempts, 2);
        assert_eq!(response.unresolved, 1);
        assert_eq!(response.outcomes.len(), 2);
        assert_eq!(response.actual_rates["Success"], 50.0);
    }

    #[test]
    fn empty_event_is_all_zero() {
        let response = assemble(&rare_drop(), Scope::GlobalOrganic, &OutcomeCounts::default(), None);
        assert_eq!(response.total_attempts, 0);
        assert!(response.actual_rates.values().all(|r| *r == 0.0));
    }

    #[test]
    fn serializes_with_flat_user_fields() {
        let response = assemble(&rare_drop(), Scope::GlobalOrganic, &counts(1, 1), None);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user_total_attempts"], 0);
        assert_eq!(json["global_scope"], "global_organic");
        assert_eq!(json["outcomes"]["Success"], 1);
    }
}
