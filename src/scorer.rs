//! Assessment scoring
//!
//! Validates an ordered list of item responses against the instrument's
//! definition, sums them, and looks the total up in the severity-band
//! table. Pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::instruments::{InstrumentCatalog, InstrumentDef, InstrumentId, SeverityBand};
use crate::types::AssessmentResponse;

/// Computed score for one answered instrument
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssessmentScore {
    pub instrument: InstrumentId,
    /// Arithmetic sum of the item scores
    pub total: u32,
    /// The unique band containing `total`
    pub band: SeverityBand,
}

/// Scorer for clinical instrument responses
pub struct AssessmentScorer;

impl AssessmentScorer {
    /// Score an ordered list of item responses against an instrument
    /// definition.
    ///
    /// The response count must equal the instrument's item count and each
    /// item must lie within the instrument's per-item range; violations
    /// report the offending index. A total outside every band means the
    /// band table itself is malformed and surfaces as a configuration
    /// error.
    pub fn score(def: &InstrumentDef, responses: &[u32]) -> Result<AssessmentScore, EngineError> {
        if responses.len() != def.item_count {
            return Err(EngineError::ItemCountMismatch {
                instrument: def.id.to_string(),
                expected: def.item_count,
                actual: responses.len(),
            });
        }

        for (index, &value) in responses.iter().enumerate() {
            if value < def.item_min || value > def.item_max {
                return Err(EngineError::ItemOutOfRange {
                    instrument: def.id.to_string(),
                    index,
                    value,
                    min: def.item_min,
                    max: def.item_max,
                });
            }
        }

        let total: u32 = responses.iter().sum();

        let band = def
            .band_for(total)
            .ok_or_else(|| EngineError::NoBandForTotal {
                instrument: def.id.to_string(),
                total,
            })?;

        Ok(AssessmentScore {
            instrument: def.id,
            total,
            band,
        })
    }

    /// Score a stored assessment response, resolving its instrument
    /// through the catalog.
    pub fn score_response(
        catalog: &InstrumentCatalog,
        response: &AssessmentResponse,
    ) -> Result<AssessmentScore, EngineError> {
        let def = catalog
            .get(response.instrument)
            .ok_or_else(|| EngineError::UnknownInstrument(response.instrument.to_string()))?;
        Self::score(def, &response.item_scores)
    }
}
