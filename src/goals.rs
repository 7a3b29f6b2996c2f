//! Goal progress evaluation
//!
//! Evaluates count-per-period and percent-improvement goals against
//! activity logs. Group scope resolves to the group's current non-deleted
//! members at evaluation time; moving an activity between groups therefore
//! changes historical evaluations retroactively.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::EngineError;
use crate::types::{
    Activity, ActivityGoal, ActivityLog, GoalKind, GoalProgress, GoalScope, GoalStatus, Period,
};

/// Evaluator for activity goals
pub struct GoalEvaluator;

impl GoalEvaluator {
    /// Evaluate a goal over `period`.
    ///
    /// `logs` must cover at least the period and, for percent-improvement
    /// goals, the immediately preceding period of equal length; entries
    /// outside those ranges are ignored. `activities` is the current
    /// activity table, used to resolve group scope.
    pub fn evaluate(
        goal: &ActivityGoal,
        period: Period,
        logs: &[ActivityLog],
        activities: &[Activity],
    ) -> Result<GoalProgress, EngineError> {
        if goal.period_days == 0 {
            return Err(EngineError::EmptyGoalPeriod);
        }

        let scoped = scoped_activity_ids(goal.scope, activities);
        let current = count_in_period(logs, &scoped, period);

        let (observed, status) = match goal.kind {
            GoalKind::CountPerPeriod => {
                let observed = current as f64;
                // Count goals are binary; there is no partial state.
                let status = if observed >= goal.target {
                    GoalStatus::Met
                } else {
                    GoalStatus::Unmet
                };
                (observed, status)
            }
            GoalKind::PercentImprovement => {
                let previous = count_in_period(logs, &scoped, period.preceding());
                evaluate_improvement(current, previous, goal.target)
            }
        };

        Ok(GoalProgress {
            goal_id: goal.id,
            observed,
            target: goal.target,
            status,
            period,
        })
    }
}

/// Percent-improvement status, handling the zero-baseline edge.
///
/// Improvement from a zero baseline is unbounded-positive, so any current
/// occurrence counts as met; no occurrences in either period is unmet.
fn evaluate_improvement(current: usize, previous: usize, target: f64) -> (f64, GoalStatus) {
    if previous == 0 {
        return if current > 0 {
            (100.0, GoalStatus::Met)
        } else {
            (0.0, GoalStatus::Unmet)
        };
    }

    let observed = ((current as f64 - previous as f64) / previous as f64) * 100.0;
    let status = if observed >= target {
        GoalStatus::Met
    } else if observed > 0.0 {
        GoalStatus::Partial
    } else {
        GoalStatus::Unmet
    };
    (observed, status)
}

/// Resolve a scope to the set of qualifying activity ids.
///
/// Group membership is read from the activity table as it stands now, not
/// as it stood when the logs were written; soft-deleted activities are
/// excluded from group resolution.
fn scoped_activity_ids(scope: GoalScope, activities: &[Activity]) -> HashSet<Uuid> {
    match scope {
        GoalScope::Activity(id) => HashSet::from([id]),
        GoalScope::Group(group_id) => activities
            .iter()
            .filter(|a| a.group_id == group_id && !a.deleted)
            .map(|a| a.id)
            .collect(),
    }
}

fn count_in_period(logs: &[ActivityLog], scoped: &HashSet<Uuid>, period: Period) -> usize {
    logs.iter()
        .filter(|log| scoped.contains(&log.activity_id) && period.contains(log.logged_at))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    fn make_activity(group_id: Uuid, deleted: bool) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            name: "walk".to_string(),
            color: None,
            icon: None,
            group_id,
            deleted,
        }
    }

    fn make_log(activity_id: Uuid, days_ago: i64) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            activity_id,
            logged_at: as_of() - Duration::days(days_ago) + Duration::hours(1),
            note: None,
        }
    }

    fn count_goal(activity_id: Uuid, target: f64) -> ActivityGoal {
        ActivityGoal {
            id: Uuid::new_v4(),
            scope: GoalScope::Activity(activity_id),
            kind: GoalKind::CountPerPeriod,
            target,
            period_days: 7,
        }
    }

    fn improvement_goal(scope: GoalScope, target: f64) -> ActivityGoal {
        ActivityGoal {
            id: Uuid::new_v4(),
            scope,
            kind: GoalKind::PercentImprovement,
            target,
            period_days: 7,
        }
    }

    #[test]
    fn test_count_goal_unmet_below_target() {
        let activity = make_activity(Uuid::new_v4(), false);
        let logs = vec![make_log(activity.id, 2), make_log(activity.id, 4)];
        let goal = count_goal(activity.id, 3.0);
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, std::slice::from_ref(&activity)).unwrap();

        assert_eq!(progress.observed, 2.0);
        assert_eq!(progress.status, GoalStatus::Unmet);
    }

    #[test]
    fn test_count_goal_met_at_target() {
        let activity = make_activity(Uuid::new_v4(), false);
        let logs = vec![
            make_log(activity.id, 1),
            make_log(activity.id, 3),
            make_log(activity.id, 5),
        ];
        let goal = count_goal(activity.id, 3.0);
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, std::slice::from_ref(&activity)).unwrap();

        assert_eq!(progress.status, GoalStatus::Met);
    }

    #[test]
    fn test_count_goal_ignores_logs_outside_period() {
        let activity = make_activity(Uuid::new_v4(), false);
        // 10 days ago falls in the preceding period, not this one
        let logs = vec![make_log(activity.id, 10)];
        let goal = count_goal(activity.id, 1.0);
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, std::slice::from_ref(&activity)).unwrap();

        assert_eq!(progress.observed, 0.0);
        assert_eq!(progress.status, GoalStatus::Unmet);
    }

    #[test]
    fn test_improvement_from_zero_baseline_is_met() {
        let activity = make_activity(Uuid::new_v4(), false);
        let logs = vec![make_log(activity.id, 1), make_log(activity.id, 2)];
        let goal = improvement_goal(GoalScope::Activity(activity.id), 20.0);
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, std::slice::from_ref(&activity)).unwrap();

        assert_eq!(progress.status, GoalStatus::Met);
    }

    #[test]
    fn test_no_occurrences_either_period_is_unmet() {
        let activity = make_activity(Uuid::new_v4(), false);
        let goal = improvement_goal(GoalScope::Activity(activity.id), 20.0);
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress =
            GoalEvaluator::evaluate(&goal, period, &[], std::slice::from_ref(&activity)).unwrap();

        assert_eq!(progress.observed, 0.0);
        assert_eq!(progress.status, GoalStatus::Unmet);
    }

    #[test]
    fn test_improvement_partial_and_unmet() {
        let activity = make_activity(Uuid::new_v4(), false);
        let goal = improvement_goal(GoalScope::Activity(activity.id), 100.0);
        let period = Period::ending_at(as_of(), 7).unwrap();

        // Previous period: 2 logs. Current period: 3 logs. +50%, under the
        // 100% target but positive.
        let logs: Vec<ActivityLog> = [1, 3, 5, 8, 10]
            .iter()
            .map(|&d| make_log(activity.id, d))
            .collect();
        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, std::slice::from_ref(&activity)).unwrap();
        assert_eq!(progress.status, GoalStatus::Partial);
        assert!((progress.observed - 50.0).abs() < 1e-9);

        // Previous period: 2 logs. Current period: 1 log. Negative change.
        let logs: Vec<ActivityLog> = [1, 8, 10]
            .iter()
            .map(|&d| make_log(activity.id, d))
            .collect();
        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, std::slice::from_ref(&activity)).unwrap();
        assert_eq!(progress.status, GoalStatus::Unmet);
        assert!(progress.observed < 0.0);
    }

    #[test]
    fn test_group_scope_unions_member_logs() {
        let group = Uuid::new_v4();
        let a = make_activity(group, false);
        let b = make_activity(group, false);
        let outside = make_activity(Uuid::new_v4(), false);

        let logs = vec![make_log(a.id, 1), make_log(b.id, 2), make_log(outside.id, 3)];
        let goal = ActivityGoal {
            id: Uuid::new_v4(),
            scope: GoalScope::Group(group),
            kind: GoalKind::CountPerPeriod,
            target: 2.0,
            period_days: 7,
        };
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress = GoalEvaluator::evaluate(
            &goal,
            period,
            &logs,
            &[a.clone(), b.clone(), outside.clone()],
        )
        .unwrap();

        assert_eq!(progress.observed, 2.0);
        assert_eq!(progress.status, GoalStatus::Met);
    }

    #[test]
    fn test_soft_deleted_activity_excluded_from_group_scope() {
        let group = Uuid::new_v4();
        let live = make_activity(group, false);
        let deleted = make_activity(group, true);

        let logs = vec![make_log(live.id, 1), make_log(deleted.id, 2)];
        let goal = ActivityGoal {
            id: Uuid::new_v4(),
            scope: GoalScope::Group(group),
            kind: GoalKind::CountPerPeriod,
            target: 2.0,
            period_days: 7,
        };
        let period = Period::ending_at(as_of(), 7).unwrap();

        let progress =
            GoalEvaluator::evaluate(&goal, period, &logs, &[live.clone(), deleted.clone()])
                .unwrap();

        assert_eq!(progress.observed, 1.0);
        assert_eq!(progress.status, GoalStatus::Unmet);
    }

    #[test]
    fn group_membership_is_resolved_at_evaluation_time() {
        // A log written while the activity belonged to group A counts
        // toward a group-B goal once the activity moves to B.
        let group_a = Uuid::new_v4();
        let group_b = Uuid::new_v4();
        let mut activity = make_activity(group_a, false);
        let log = make_log(activity.id, 2);

        let goal = ActivityGoal {
            id: Uuid::new_v4(),
            scope: GoalScope::Group(group_b),
            kind: GoalKind::CountPerPeriod,
            target: 1.0,
            period_days: 7,
        };
        let period = Period::ending_at(as_of(), 7).unwrap();

        let before = GoalEvaluator::evaluate(
            &goal,
            period,
            std::slice::from_ref(&log),
            std::slice::from_ref(&activity),
        )
        .unwrap();
        assert_eq!(before.status, GoalStatus::Unmet);

        activity.group_id = group_b;
        let after = GoalEvaluator::evaluate(
            &goal,
            period,
            std::slice::from_ref(&log),
            std::slice::from_ref(&activity),
        )
        .unwrap();
        assert_eq!(after.observed, 1.0);
        assert_eq!(after.status, GoalStatus::Met);
    }

    #[test]
    fn test_zero_day_period_rejected() {
        let activity = make_activity(Uuid::new_v4(), false);
        let mut goal = count_goal(activity.id, 1.0);
        goal.period_days = 0;
        let period = Period::ending_at(as_of(), 7).unwrap();

        let err = GoalEvaluator::evaluate(&goal, period, &[], std::slice::from_ref(&activity))
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyGoalPeriod));
    }
}
