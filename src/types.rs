//! Core types for the Moodlens engine
//!
//! This module defines the record shapes supplied by the persistence layer
//! (check-ins, activities, logs, goals, assessment responses) and the
//! derived result shapes the engine hands back to the presentation layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::instruments::InstrumentId;
use crate::scale::MoodScale;

/// One answered instrument instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub id: Uuid,
    pub instrument: InstrumentId,
    /// Item scores in questionnaire order
    pub item_scores: Vec<u32>,
    pub completed_at: DateTime<Utc>,
}

/// One mood entry on the 1-7 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodCheckin {
    pub id: Uuid,
    /// Rating within the configured mood scale
    pub rating: u8,
    /// Optional free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Activities linked to this check-in
    #[serde(default)]
    pub activity_ids: Vec<Uuid>,
    pub recorded_at: DateTime<Utc>,
}

impl MoodCheckin {
    /// Check the rating against a mood scale.
    pub fn validate(&self, scale: MoodScale) -> Result<(), EngineError> {
        if scale.contains(self.rating) {
            Ok(())
        } else {
            Err(EngineError::RatingOutOfRange {
                value: self.rating,
                min: scale.min,
                max: scale.max,
            })
        }
    }
}

/// A trackable behavior, owned by exactly one group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub group_id: Uuid,
    /// Soft-deleted activities are excluded from new goal scope resolution
    /// but their historical logs stay in aggregates.
    #[serde(default)]
    pub deleted: bool,
}

/// A named category of activities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// One occurrence of an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub logged_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// What a goal targets: a single activity or a whole group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalScope {
    Activity(Uuid),
    Group(Uuid),
}

impl GoalScope {
    /// Build a scope from the pair of optional ids a persistence record
    /// carries. Exactly one must be set.
    pub fn from_parts(
        activity_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Result<Self, EngineError> {
        match (activity_id, group_id) {
            (Some(id), None) => Ok(GoalScope::Activity(id)),
            (None, Some(id)) => Ok(GoalScope::Group(id)),
            _ => Err(EngineError::MalformedGoalScope),
        }
    }
}

/// How a goal's target is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Target is a minimum occurrence count within the period
    CountPerPeriod,
    /// Target is a minimum percent increase in frequency over the
    /// immediately preceding period of equal length
    PercentImprovement,
}

/// A target for an activity or group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityGoal {
    pub id: Uuid,
    pub scope: GoalScope,
    pub kind: GoalKind,
    /// Occurrence count or percent, depending on `kind`
    pub target: f64,
    /// Length of the evaluation period in days
    pub period_days: u32,
}

/// Outcome of a goal evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Met,
    Partial,
    Unmet,
}

/// Evaluation result for one goal over one period.
///
/// Derived on demand, never persisted independently of its goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub observed: f64,
    pub target: f64,
    pub status: GoalStatus,
    pub period: Period,
}

/// A half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Create a period, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EngineError> {
        if start >= end {
            return Err(EngineError::InvalidPeriod {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// The period of `days` length ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Result<Self, EngineError> {
        if days == 0 {
            return Err(EngineError::EmptyGoalPeriod);
        }
        Self::new(end - Duration::days(i64::from(days)), end)
    }

    /// The period of equal length immediately before this one.
    pub fn preceding(&self) -> Self {
        let span = self.end - self.start;
        Self {
            start: self.start - span,
            end: self.start,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Summary statistics over a sequence of mood check-ins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSummary {
    /// Mean rating, 0 when no check-ins were supplied
    pub average_rating: f64,
    pub count: usize,
    /// The newest check-in, absent when no check-ins were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_recent: Option<MoodCheckin>,
}

/// Mean mood over the check-ins linked to one activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCorrelation {
    pub activity_id: Uuid,
    pub average_rating: f64,
    pub sample_count: usize,
}
