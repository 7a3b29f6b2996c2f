//! Moodlens - scoring and aggregation engine for local-first mental-health tracking
//!
//! Moodlens turns raw tracker records into derived read-models through a
//! set of pure computations: assessment scoring → mood aggregation → goal
//! evaluation → trend comparison → dashboard assembly.
//!
//! ## Modules
//!
//! - **Assessment Scorer**: score PHQ-9/GAD-7/CES-D/OASIS responses into
//!   totals and severity bands
//! - **Mood Aggregator**: summary statistics and per-activity correlation
//!   over mood check-ins
//! - **Goal Progress Evaluator**: count and percent-improvement goals over
//!   activity logs
//! - **Trend Comparator**: deadbanded, polarity-aware change direction

pub mod dashboard;
pub mod error;
pub mod goals;
pub mod instruments;
pub mod mood;
pub mod report;
pub mod scale;
pub mod scorer;
pub mod trend;
pub mod types;

// FFI bindings for the desktop shell (always available for cdylib/staticlib builds)
pub mod ffi;

pub use dashboard::{build_dashboard, Dashboard, DashboardBuilder, Snapshot};
pub use error::EngineError;
pub use goals::GoalEvaluator;
pub use instruments::{InstrumentCatalog, InstrumentId, Severity, SeverityBand};
pub use mood::MoodAggregator;
pub use report::{Report, ReportEncoder};
pub use scale::{rescale, MoodScale};
pub use scorer::{AssessmentScore, AssessmentScorer};
pub use trend::{Polarity, Trend, TrendComparator, TrendDirection};

/// Engine version embedded in all report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "moodlens";
