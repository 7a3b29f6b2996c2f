//! Mood scale normalization
//!
//! The engine scores mood on a 1-7 scale. Older check-ins recorded on the
//! original 1-5 scale are rescaled linearly onto the current scale so that
//! history stays comparable after the migration.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Inclusive rating bounds for a mood scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodScale {
    pub min: u8,
    pub max: u8,
}

impl MoodScale {
    /// The current 1-7 check-in scale.
    pub const fn seven_point() -> Self {
        Self { min: 1, max: 7 }
    }

    /// The legacy 1-5 scale used by early versions of the tracker.
    pub const fn five_point() -> Self {
        Self { min: 1, max: 5 }
    }

    pub fn contains(&self, rating: u8) -> bool {
        self.min <= rating && rating <= self.max
    }

    fn span(&self) -> u8 {
        self.max.saturating_sub(self.min)
    }
}

impl Default for MoodScale {
    fn default() -> Self {
        Self::seven_point()
    }
}

/// Linearly map `rating` from one scale onto another, rounding to the
/// nearest step.
///
/// Endpoints map to endpoints, so 1 on the 1-5 scale becomes 1 on the 1-7
/// scale and 5 becomes 7.
pub fn rescale(rating: u8, from: MoodScale, to: MoodScale) -> Result<u8, EngineError> {
    if from.span() == 0 {
        return Err(EngineError::DegenerateScale {
            min: from.min,
            max: from.max,
        });
    }
    if !from.contains(rating) {
        return Err(EngineError::RatingOutOfRange {
            value: rating,
            min: from.min,
            max: from.max,
        });
    }

    let position = f64::from(rating - from.min) / f64::from(from.span());
    let mapped = position * f64::from(to.span()) + f64::from(to.min);
    Ok(mapped.round() as u8)
}
