//! Error types for the Moodlens engine
//!
//! Two kinds of failure exist: the caller supplied malformed data
//! (invalid-input variants), or a static instrument definition is
//! malformed (configuration variants). The latter are meant to be caught
//! once by catalog validation at process start, not handled per call.

use thiserror::Error;

/// Errors produced by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("{instrument}: expected {expected} item responses, got {actual}")]
    ItemCountMismatch {
        instrument: String,
        expected: usize,
        actual: usize,
    },

    #[error("{instrument}: item {index} is {value}, outside allowed range {min}..={max}")]
    ItemOutOfRange {
        instrument: String,
        index: usize,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("mood rating {value} outside scale {min}..={max}")]
    RatingOutOfRange { value: u8, min: u8, max: u8 },

    #[error("mood scale {min}..={max} is degenerate")]
    DegenerateScale { min: u8, max: u8 },

    #[error("goal scope must name exactly one of activity or group")]
    MalformedGoalScope,

    #[error("goal period must be at least one day")]
    EmptyGoalPeriod,

    #[error("period start {start} is not before end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("{instrument}: severity band table is empty")]
    EmptyBandTable { instrument: String },

    #[error("{instrument}: band {low}..={high} is inverted")]
    InvertedBand {
        instrument: String,
        low: u32,
        high: u32,
    },

    #[error("{instrument}: severity bands leave a gap or overlap at score {score}")]
    BandCoverageBreak { instrument: String, score: u32 },

    #[error("{instrument}: severity bands cover {low}..={high}, expected {expected_low}..={expected_high}")]
    BandSpanMismatch {
        instrument: String,
        low: u32,
        high: u32,
        expected_low: u32,
        expected_high: u32,
    },

    #[error("no severity band contains total {total} for {instrument}")]
    NoBandForTotal { instrument: String, total: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether this error reflects a defect in static instrument
    /// configuration rather than bad caller input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::EmptyBandTable { .. }
                | EngineError::InvertedBand { .. }
                | EngineError::BandCoverageBreak { .. }
                | EngineError::BandSpanMismatch { .. }
                | EngineError::NoBandForTotal { .. }
        )
    }
}
