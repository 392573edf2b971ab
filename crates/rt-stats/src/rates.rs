//! Observed rates and their deviation from expectation.
//!
//! For each outcome, with `n` admitted logs of which `k` hit the outcome and
//! an expected probability `p`:
//! - actual rate: `k / n * 100`, or exactly `0.0` when `n == 0`
//! - expected rate: `p * 100`
//! - deviation: actual minus expected, in percentage points
//! - expected hits: `n * p`, and the hit deviation `k - n * p`
//!
//! Every figure is rounded to [`DECIMALS`] places. Deviations are taken
//! between the rounded figures, so a reported deviation always equals the
//! difference of the reported values it compares.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rt_core::Probability;

/// Decimal places kept in every rate, deviation, and expected-hit figure.
pub const DECIMALS: i32 = 2;

/// Round half away from zero to [`DECIMALS`] places.
pub fn round(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    let rounded = (value * scale).round() / scale;
    // Avoid reporting "-0.00".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Observed versus expected figures for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRate {
    /// Logs that hit this outcome.
    pub count: u64,
    /// Share of logs that hit this outcome, in percent.
    pub actual_rate_pct: f64,
    /// Expected probability, in percent.
    pub expected_rate_pct: f64,
    /// `actual_rate_pct - expected_rate_pct`. Positive means luckier than expected.
    pub deviation_pct: f64,
    /// How many hits the expected probability predicts for the total.
    pub expected_hits: f64,
    /// `count - expected_hits`.
    pub hit_deviation: f64,
}

impl OutcomeRate {
    /// Compute the figures for one outcome.
    pub fn new(count: u64, total: u64, expected: Probability) -> Self {
        let actual = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let actual_rate_pct = round(actual);
        let expected_rate_pct = round(expected.as_percent());
        let expected_hits = round(total as f64 * expected.value());
        Self {
            count,
            actual_rate_pct,
            expected_rate_pct,
            deviation_pct: round(actual_rate_pct - expected_rate_pct),
            expected_hits,
            hit_deviation: round(count as f64 - expected_hits),
        }
    }

    /// Whether the outcome occurred more often than expected.
    pub fn is_above_expected(&self) -> bool {
        self.deviation_pct > 0.0
    }
}

/// Rates for every key in `expected`.
///
/// Keys missing from `counts` count as zero. Keys present only in `counts`
/// have no expectation to compare against and are left out.
pub fn compute<K>(
    counts: &BTreeMap<K, u64>,
    total: u64,
    expected: &BTreeMap<K, Probability>,
) -> BTreeMap<K, OutcomeRate>
where
    K: Ord + Clone,
{
    expected
        .iter()
        .map(|(key, p)| {
            let count = counts.get(key).copied().unwrap_or(0);
            (key.clone(), OutcomeRate::new(count, total, *p))
        })
        .collect()
}

/// Rates for an event described by a single success probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryRates {
    /// Figures for the success class, expected at `p`.
    pub success: OutcomeRate,
    /// Figures for the failure class, expected at `1 - p`.
    pub failure: OutcomeRate,
}

impl BinaryRates {
    /// Whether successes came more often than expected.
    pub fn is_above_expected(&self) -> bool {
        self.success.is_above_expected()
    }
}

/// Rates for a success/failure event with one aggregate probability.
///
/// Attempts that were not successes are failures. `successes` larger than
/// `total` is treated as `total`.
pub fn compute_binary(successes: u64, total: u64, success_probability: Probability) -> BinaryRates {
    let successes = successes.min(total);
    BinaryRates {
        success: OutcomeRate::new(successes, total, success_probability),
        failure: OutcomeRate::new(total - successes, total, success_probability.complement()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(value: f64) -> Probability {
        Probability::new(value).unwrap()
    }

    #[test]
    fn deviation_sign_above_expected() {
        let rate = OutcomeRate::new(80, 100, p(0.5));
        assert_eq!(rate.actual_rate_pct, 80.0);
        assert_eq!(rate.expected_rate_pct, 50.0);
        assert_eq!(rate.deviation_pct, 30.0);
        assert!(rate.is_above_expected());
        assert_eq!(rate.expected_hits, 50.0);
        assert_eq!(rate.hit_deviation, 30.0);
    }

    #[test]
    fn zero_total_has_zero_actual_rate() {
        for expected in [0.0, 0.05, 0.333, 1.0] {
            let rate = OutcomeRate::new(0, 0, p(expected));
            assert_eq!(rate.actual_rate_pct, 0.0);
            assert_eq!(rate.deviation_pct, -rate.expected_rate_pct);
            assert!(!rate.is_above_expected());
        }
    }

    #[test]
    fn rare_drop_scenario() {
        let counts = BTreeMap::from([("Success", 12u64), ("Failure", 188)]);
        let expected = BTreeMap::from([("Success", p(0.05)), ("Failure", p(0.95))]);
        let rates = compute(&counts, 200, &expected);

        assert!((rates["Success"].actual_rate_pct - 6.0).abs() < 1e-9);
        assert!((rates["Success"].deviation_pct - 1.0).abs() < 1e-9);
        assert!((rates["Failure"].deviation_pct + 1.0).abs() < 1e-9);
        assert!(!rates["Failure"].is_above_expected());
    }

    #[test]
    fn outputs_round_to_two_places() {
        let rate = OutcomeRate::new(1, 3, p(0.5));
        assert_eq!(rate.actual_rate_pct, 33.33);
        assert_eq!(rate.deviation_pct, -16.67);
    }

    #[test]
    fn deviation_agrees_with_reported_rates() {
        let rate = OutcomeRate::new(1, 800, p(0.001149));
        assert_eq!(rate.actual_rate_pct, 0.13);
        assert_eq!(rate.expected_rate_pct, 0.11);
        assert_eq!(rate.deviation_pct, 0.02);
        assert_eq!(
            rate.deviation_pct,
            round(rate.actual_rate_pct - rate.expected_rate_pct)
        );
        assert_eq!(rate.expected_hits, 0.92);
        assert_eq!(rate.hit_deviation, 0.08);
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let counts: BTreeMap<&str, u64> = BTreeMap::from([("Hit", 4)]);
        let expected = BTreeMap::from([("Hit", p(0.5)), ("Miss", p(0.5))]);
        let rates = compute(&counts, 4, &expected);
        assert_eq!(rates["Miss"].count, 0);
        assert_eq!(rates["Miss"].deviation_pct, -50.0);
    }

    #[test]
    fn counts_without_expectation_are_left_out() {
        let counts = BTreeMap::from([("Hit", 1u64), ("Ghost", 1)]);
        let expected = BTreeMap::from([("Hit", p(1.0))]);
        let rates = compute(&counts, 2, &expected);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates["Hit"].actual_rate_pct, 50.0);
    }

    #[test]
    fn binary_event_uses_complement_for_failure() {
        let rates = compute_binary(12, 200, p(0.05));
        assert_eq!(rates.success.actual_rate_pct, 6.0);
        assert_eq!(rates.success.deviation_pct, 1.0);
        assert_eq!(rates.failure.count, 188);
        assert_eq!(rates.failure.expected_rate_pct, 95.0);
        assert_eq!(rates.failure.deviation_pct, -1.0);
        assert!(rates.is_above_expected());
    }

    #[test]
    fn binary_clamps_successes_to_total() {
        let rates = compute_binary(5, 3, p(0.5));
        assert_eq!(rates.success.count, 3);
        assert_eq!(rates.failure.count, 0);
    }

    #[test]
    fn round_never_returns_negative_zero() {
        assert!(round(-0.001).is_sign_positive());
    }
}
