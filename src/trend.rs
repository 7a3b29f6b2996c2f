//! Trend comparison
//!
//! Compares a current value against a previous one and reports a signed
//! delta plus a qualitative direction. Changes smaller than the deadband
//! read as flat. Whether a positive delta is an improvement depends on the
//! metric: symptom scores improve downward, mood and activity frequency
//! improve upward, so polarity is supplied by the caller.

use serde::{Deserialize, Serialize};

/// Default deadband below which a change reads as flat
pub const DEFAULT_DEADBAND: f64 = 1.0;

/// Which direction counts as improvement for a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher values are better (mood ratings, activity frequency)
    HigherIsBetter,
    /// Lower values are better (depression and anxiety scores)
    LowerIsBetter,
}

/// Qualitative direction of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Worsening,
    Flat,
}

/// A signed change with its qualitative reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Trend {
    /// `current - previous`
    pub delta: f64,
    pub direction: TrendDirection,
}

/// Comparator with a fixed deadband
#[derive(Debug, Clone, Copy)]
pub struct TrendComparator {
    deadband: f64,
}

impl Default for TrendComparator {
    fn default() -> Self {
        Self::new(DEFAULT_DEADBAND)
    }
}

impl TrendComparator {
    /// Create a comparator with the given deadband magnitude.
    pub fn new(deadband: f64) -> Self {
        Self {
            deadband: deadband.abs(),
        }
    }

    /// Compare `current` against `previous` under the given polarity.
    pub fn compare(&self, current: f64, previous: f64, polarity: Polarity) -> Trend {
        let delta = current - previous;

        let direction = if delta.abs() < self.deadband {
            TrendDirection::Flat
        } else {
            let increased = delta > 0.0;
            let improved = match polarity {
                Polarity::HigherIsBetter => increased,
                Polarity::LowerIsBetter => !increased,
            };
            if improved {
                TrendDirection::Improving
            } else {
                TrendDirection::Worsening
            }
        };

        Trend { delta, direction }
    }
}
