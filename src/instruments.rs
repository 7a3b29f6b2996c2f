//! Instrument catalog
//!
//! Each supported questionnaire is a declarative record: item count,
//! per-item score range, and a severity-band table over the total-score
//! span. The band tables carry the published clinical cutoffs; they are
//! data validated once at process start, not constants scattered through
//! scoring branches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Identifier of a supported clinical instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentId {
    Phq9,
    Gad7,
    CesD,
    Oasis,
}

impl InstrumentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentId::Phq9 => "phq9",
            InstrumentId::Gad7 => "gad7",
            InstrumentId::CesD => "cesd",
            InstrumentId::Oasis => "oasis",
        }
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phq9" | "phq-9" => Ok(InstrumentId::Phq9),
            "gad7" | "gad-7" => Ok(InstrumentId::Gad7),
            "cesd" | "ces-d" => Ok(InstrumentId::CesD),
            "oasis" => Ok(InstrumentId::Oasis),
            other => Err(EngineError::UnknownInstrument(other.to_string())),
        }
    }
}

/// Severity label for a scoring bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minimal => "minimal",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::ModeratelySevere => "moderately_severe",
            Severity::Severe => "severe",
        }
    }
}

/// A labeled, inclusive sub-range of an instrument's total-score span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub low: u32,
    pub high: u32,
    pub severity: Severity,
}

impl SeverityBand {
    pub fn contains(&self, total: u32) -> bool {
        self.low <= total && total <= self.high
    }
}

/// Declarative definition of one instrument
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentDef {
    pub id: InstrumentId,
    pub name: &'static str,
    /// Number of items in the questionnaire
    pub item_count: usize,
    /// Inclusive per-item score range
    pub item_min: u32,
    pub item_max: u32,
    /// Bands partitioning `min_total()..=max_total()`
    pub bands: Vec<SeverityBand>,
}

impl InstrumentDef {
    pub fn min_total(&self) -> u32 {
        self.item_min * self.item_count as u32
    }

    pub fn max_total(&self) -> u32 {
        self.item_max * self.item_count as u32
    }

    /// The unique band containing `total`, if the table covers it.
    pub fn band_for(&self, total: u32) -> Option<SeverityBand> {
        self.bands.iter().copied().find(|b| b.contains(total))
    }
}

fn band(low: u32, high: u32, severity: Severity) -> SeverityBand {
    SeverityBand {
        low,
        high,
        severity,
    }
}

/// The set of instruments the engine can score
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<InstrumentDef>,
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl InstrumentCatalog {
    /// Catalog of the four built-in instruments with their published
    /// cutoff tables.
    pub fn builtin() -> Self {
        Self {
            instruments: vec![
                InstrumentDef {
                    id: InstrumentId::Phq9,
                    name: "Patient Health Questionnaire-9",
                    item_count: 9,
                    item_min: 0,
                    item_max: 3,
                    bands: vec![
                        band(0, 4, Severity::Minimal),
                        band(5, 9, Severity::Mild),
                        band(10, 14, Severity::Moderate),
                        band(15, 19, Severity::ModeratelySevere),
                        band(20, 27, Severity::Severe),
                    ],
                },
                InstrumentDef {
                    id: InstrumentId::Gad7,
                    name: "Generalized Anxiety Disorder-7",
                    item_count: 7,
                    item_min: 0,
                    item_max: 3,
                    bands: vec![
                        band(0, 4, Severity::Minimal),
                        band(5, 9, Severity::Mild),
                        band(10, 14, Severity::Moderate),
                        band(15, 21, Severity::Severe),
                    ],
                },
                InstrumentDef {
                    id: InstrumentId::CesD,
                    name: "Center for Epidemiologic Studies Depression Scale",
                    item_count: 20,
                    item_min: 0,
                    item_max: 3,
                    bands: vec![
                        band(0, 15, Severity::Minimal),
                        band(16, 20, Severity::Mild),
                        band(21, 30, Severity::Moderate),
                        band(31, 60, Severity::Severe),
                    ],
                },
                InstrumentDef {
                    id: InstrumentId::Oasis,
                    name: "Overall Anxiety Severity and Impairment Scale",
                    item_count: 5,
                    item_min: 0,
                    item_max: 4,
                    bands: vec![
                        band(0, 7, Severity::Minimal),
                        band(8, 14, Severity::Moderate),
                        band(15, 20, Severity::Severe),
                    ],
                },
            ],
        }
    }

    pub fn get(&self, id: InstrumentId) -> Option<&InstrumentDef> {
        self.instruments.iter().find(|def| def.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentDef> {
        self.instruments.iter()
    }

    /// Check every band table: non-empty, no inverted bands, contiguous
    /// coverage of the full total-score span with no gap or overlap.
    ///
    /// Intended to run once at startup; a failure here is a configuration
    /// defect, not a runtime condition.
    pub fn validate(&self) -> Result<(), EngineError> {
        for def in &self.instruments {
            validate_bands(def)?;
        }
        Ok(())
    }
}

fn validate_bands(def: &InstrumentDef) -> Result<(), EngineError> {
    let instrument = def.id.to_string();

    let Some(first) = def.bands.first() else {
        return Err(EngineError::EmptyBandTable { instrument });
    };

    for b in &def.bands {
        if b.low > b.high {
            return Err(EngineError::InvertedBand {
                instrument,
                low: b.low,
                high: b.high,
            });
        }
    }

    let mut expected_low = def.min_total();
    for b in &def.bands {
        if b.low != expected_low {
            return Err(EngineError::BandCoverageBreak {
                instrument,
                score: expected_low,
            });
        }
        expected_low = b.high + 1;
    }

    let last = def.bands.last().unwrap_or(first);
    if first.low != def.min_total() || last.high != def.max_total() {
        return Err(EngineError::BandSpanMismatch {
            instrument,
            low: first.low,
            high: last.high,
            expected_low: def.min_total(),
            expected_high: def.max_total(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_validates() {
        InstrumentCatalog::builtin().validate().unwrap();
    }

    #[test]
    fn test_every_total_has_exactly_one_band() {
        let catalog = InstrumentCatalog::builtin();

        for def in catalog.iter() {
            for total in def.min_total()..=def.max_total() {
                let matching = def.bands.iter().filter(|b| b.contains(total)).count();
                assert_eq!(
                    matching, 1,
                    "{}: total {} matched {} bands",
                    def.id, total, matching
                );
            }
        }
    }

    #[test]
    fn test_phq9_has_five_bands() {
        let catalog = InstrumentCatalog::builtin();
        let phq9 = catalog.get(InstrumentId::Phq9).unwrap();

        assert_eq!(phq9.bands.len(), 5);
        assert_eq!(phq9.max_total(), 27);
        assert_eq!(phq9.band_for(12).unwrap().severity, Severity::Moderate);
    }

    #[test]
    fn test_gap_is_detected() {
        let def = InstrumentDef {
            id: InstrumentId::Phq9,
            name: "broken",
            item_count: 9,
            item_min: 0,
            item_max: 3,
            bands: vec![
                band(0, 4, Severity::Minimal),
                // Gap: 5 is uncovered
                band(6, 27, Severity::Severe),
            ],
        };

        let err = validate_bands(&def).unwrap_err();
        assert!(matches!(
            err,
            EngineError::BandCoverageBreak { score: 5, .. }
        ));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_overlap_is_detected() {
        let def = InstrumentDef {
            id: InstrumentId::Gad7,
            name: "broken",
            item_count: 7,
            item_min: 0,
            item_max: 3,
            bands: vec![
                band(0, 5, Severity::Minimal),
                // Overlap: 5 covered twice
                band(5, 21, Severity::Severe),
            ],
        };

        assert!(validate_bands(&def).is_err());
    }

    #[test]
    fn test_short_span_is_detected() {
        let def = InstrumentDef {
            id: InstrumentId::Oasis,
            name: "broken",
            item_count: 5,
            item_min: 0,
            item_max: 4,
            bands: vec![band(0, 19, Severity::Minimal)],
        };

        let err = validate_bands(&def).unwrap_err();
        assert!(matches!(err, EngineError::BandSpanMismatch { .. }));
    }

    #[test]
    fn test_instrument_id_parsing() {
        assert_eq!("phq9".parse::<InstrumentId>().unwrap(), InstrumentId::Phq9);
        assert_eq!("PHQ-9".parse::<InstrumentId>().unwrap(), InstrumentId::Phq9);
        assert_eq!("ces-d".parse::<InstrumentId>().unwrap(), InstrumentId::CesD);
        assert!("phq2".parse::<InstrumentId>().is_err());
    }
}
