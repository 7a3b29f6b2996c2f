//! Dashboard assembly
//!
//! Composes the individual computations into the read-model the
//! presentation layer renders: latest assessment scores with trends, the
//! current window's mood summary and trend, per-activity correlations,
//! and progress for every goal. One immutable snapshot in, one dashboard
//! out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::goals::GoalEvaluator;
use crate::instruments::{InstrumentCatalog, InstrumentId};
use crate::mood::MoodAggregator;
use crate::scorer::{AssessmentScore, AssessmentScorer};
use crate::trend::{Polarity, Trend, TrendComparator};
use crate::types::{
    Activity, ActivityCorrelation, ActivityGoal, ActivityGroup, ActivityLog, AssessmentResponse,
    GoalProgress, MoodCheckin, MoodSummary, Period,
};

/// Everything the persistence layer loads for one dashboard build.
///
/// Record order is not significant; the builder sorts what it needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub assessments: Vec<AssessmentResponse>,
    #[serde(default)]
    pub checkins: Vec<MoodCheckin>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub groups: Vec<ActivityGroup>,
    #[serde(default)]
    pub goals: Vec<ActivityGoal>,
    #[serde(default)]
    pub logs: Vec<ActivityLog>,
}

/// Latest score for one instrument with its trend against the response
/// before it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentOverview {
    pub instrument: InstrumentId,
    pub latest: AssessmentScore,
    pub completed_at: DateTime<Utc>,
    /// Absent when only one response exists for the instrument
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

/// Mood summary for the window plus trend against the preceding window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodOverview {
    pub summary: MoodSummary,
    /// Absent when either window has no check-ins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

/// The assembled dashboard read-model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub window: Period,
    pub assessments: Vec<AssessmentOverview>,
    pub mood: MoodOverview,
    pub correlations: Vec<ActivityCorrelation>,
    pub goals: Vec<GoalProgress>,
}

/// Builder holding the catalog and trend configuration
pub struct DashboardBuilder {
    catalog: InstrumentCatalog,
    comparator: TrendComparator,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardBuilder {
    /// Builder over the builtin catalog with the default deadband.
    pub fn new() -> Self {
        Self {
            catalog: InstrumentCatalog::builtin(),
            comparator: TrendComparator::default(),
        }
    }

    /// Builder with a specific trend deadband.
    pub fn with_deadband(deadband: f64) -> Self {
        Self {
            catalog: InstrumentCatalog::builtin(),
            comparator: TrendComparator::new(deadband),
        }
    }

    /// Assemble the dashboard for the window of `window_days` ending at
    /// `as_of`.
    pub fn build(
        &self,
        snapshot: &Snapshot,
        as_of: DateTime<Utc>,
        window_days: u32,
    ) -> Result<Dashboard, EngineError> {
        let window = Period::ending_at(as_of, window_days)?;

        let assessments = self.build_assessments(&snapshot.assessments)?;
        let mood = self.build_mood(&snapshot.checkins, window);
        let correlations = build_correlations(snapshot, window);
        let goals = self.build_goals(snapshot, as_of)?;

        Ok(Dashboard {
            window,
            assessments,
            mood,
            correlations,
            goals,
        })
    }

    /// Latest score per instrument, with a trend against the response
    /// before it where one exists. Symptom scores improve downward.
    fn build_assessments(
        &self,
        responses: &[AssessmentResponse],
    ) -> Result<Vec<AssessmentOverview>, EngineError> {
        let mut overviews = Vec::new();

        for def in self.catalog.iter() {
            let mut history: Vec<&AssessmentResponse> = responses
                .iter()
                .filter(|r| r.instrument == def.id)
                .collect();
            history.sort_by_key(|r| std::cmp::Reverse(r.completed_at));

            let Some(latest_response) = history.first() else {
                continue;
            };
            let latest = AssessmentScorer::score(def, &latest_response.item_scores)?;

            let trend = match history.get(1) {
                Some(previous_response) => {
                    let previous = AssessmentScorer::score(def, &previous_response.item_scores)?;
                    Some(self.comparator.compare(
                        f64::from(latest.total),
                        f64::from(previous.total),
                        Polarity::LowerIsBetter,
                    ))
                }
                None => None,
            };

            overviews.push(AssessmentOverview {
                instrument: def.id,
                latest,
                completed_at: latest_response.completed_at,
                trend,
            });
        }

        Ok(overviews)
    }

    /// Mood summary over the window, compared against the preceding
    /// window when both hold data.
    fn build_mood(&self, checkins: &[MoodCheckin], window: Period) -> MoodOverview {
        let current = checkins_in_window(checkins, window);
        let previous = checkins_in_window(checkins, window.preceding());

        let summary = MoodAggregator::summarize(&current);
        let previous_summary = MoodAggregator::summarize(&previous);

        let trend = if summary.count > 0 && previous_summary.count > 0 {
            Some(self.comparator.compare(
                summary.average_rating,
                previous_summary.average_rating,
                Polarity::HigherIsBetter,
            ))
        } else {
            None
        };

        MoodOverview { summary, trend }
    }

    fn build_goals(
        &self,
        snapshot: &Snapshot,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<GoalProgress>, EngineError> {
        let mut progress = Vec::with_capacity(snapshot.goals.len());
        for goal in &snapshot.goals {
            let period = Period::ending_at(as_of, goal.period_days)?;
            progress.push(GoalEvaluator::evaluate(
                goal,
                period,
                &snapshot.logs,
                &snapshot.activities,
            )?);
        }
        Ok(progress)
    }
}

/// Assemble a dashboard with the default builder.
pub fn build_dashboard(
    snapshot: &Snapshot,
    as_of: DateTime<Utc>,
    window_days: u32,
) -> Result<Dashboard, EngineError> {
    DashboardBuilder::new().build(snapshot, as_of, window_days)
}

/// Window filter honoring the aggregator's newest-first contract.
fn checkins_in_window(checkins: &[MoodCheckin], window: Period) -> Vec<MoodCheckin> {
    let mut windowed: Vec<MoodCheckin> = checkins
        .iter()
        .filter(|c| window.contains(c.recorded_at))
        .cloned()
        .collect();
    windowed.sort_by_key(|c| std::cmp::Reverse(c.recorded_at));
    windowed
}

/// Mean mood per non-deleted activity over the window's check-ins.
///
/// Activities with no linked check-ins in the window are omitted rather
/// than reported as zero.
fn build_correlations(snapshot: &Snapshot, window: Period) -> Vec<ActivityCorrelation> {
    let windowed = checkins_in_window(&snapshot.checkins, window);

    snapshot
        .activities
        .iter()
        .filter(|a| !a.deleted)
        .filter_map(|a| MoodAggregator::correlate(&windowed, a.id))
        .collect()
}
