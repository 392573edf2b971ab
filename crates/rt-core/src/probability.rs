//! Probability values and the normalizer that produces them.
//!
//! Every probability that enters the ledger passes through [`normalize`], so
//! a value typed as `5` (percent) and one typed as `0.05` (fraction) end up
//! stored identically. Out-of-range input is rejected, never clamped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TrackError, TrackResult};

/// How a raw probability value should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityUnit {
    /// `X` means an `X%` chance. Valid range is 0 to 100.
    #[default]
    Percent,
    /// The value is already a unit-interval probability. Valid range is 0 to 1.
    Fraction,
}

impl ProbabilityUnit {
    /// Largest raw value accepted in this unit.
    pub fn max(self) -> f64 {
        match self {
            Self::Percent => 100.0,
            Self::Fraction => 1.0,
        }
    }

    /// Human-readable accepted range, used in error messages.
    pub fn range_label(self) -> &'static str {
        match self {
            Self::Percent => "0..=100",
            Self::Fraction => "0..=1",
        }
    }
}

impl fmt::Display for ProbabilityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent => write!(f, "percent"),
            Self::Fraction => write!(f, "fraction"),
        }
    }
}

impl FromStr for ProbabilityUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "pct" | "%" => Ok(Self::Percent),
            "fraction" | "frac" => Ok(Self::Fraction),
            other => Err(format!("unknown probability unit: \"{other}\"")),
        }
    }
}

/// A probability in the closed unit interval.
///
/// Construct through [`normalize`] or [`Probability::new`]; both reject
/// values outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// Wrap a unit-interval value.
    pub fn new(value: f64) -> TrackResult<Self> {
        normalize(value, ProbabilityUnit::Fraction)
    }

    /// The probability as a fraction in `[0, 1]`.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The probability in percentage points.
    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }

    /// The complementary probability `1 - p`.
    pub fn complement(self) -> Self {
        Self((1.0 - self.0).max(0.0))
    }
}

impl TryFrom<f64> for Probability {
    type Error = TrackError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// Convert a raw probability in the given unit into a [`Probability`].
///
/// Non-finite values and values outside the unit's range fail with
/// [`TrackError::InvalidScopeInput`].
pub fn normalize(raw: f64, unit: ProbabilityUnit) -> TrackResult<Probability> {
    if !raw.is_finite() || !(0.0..=unit.max()).contains(&raw) {
        return Err(TrackError::InvalidScopeInput { value: raw, unit });
    }
    let value = match unit {
        ProbabilityUnit::Percent => raw / 100.0,
        ProbabilityUnit::Fraction => raw,
    };
    Ok(Probability(value))
}
