//! Mood aggregation
//!
//! Summary statistics and per-activity correlation over mood check-ins.
//! Callers supply check-ins pre-sorted newest-first and pre-filtered to
//! the window of interest; the aggregator neither sorts nor filters by
//! date.

use uuid::Uuid;

use crate::types::{ActivityCorrelation, MoodCheckin, MoodSummary};

/// Aggregator over mood check-in sequences
pub struct MoodAggregator;

impl MoodAggregator {
    /// Summarize a newest-first sequence of check-ins.
    ///
    /// An empty sequence yields an average of 0 and no `most_recent`
    /// entry, so display code never has to special-case "no data".
    pub fn summarize(checkins: &[MoodCheckin]) -> MoodSummary {
        let count = checkins.len();
        let average_rating = match mean_rating(checkins.iter()) {
            Some(mean) => mean,
            None => 0.0,
        };

        MoodSummary {
            average_rating,
            count,
            most_recent: checkins.first().cloned(),
        }
    }

    /// Mean rating over the check-ins linked to `activity_id`.
    ///
    /// Returns `None` when no check-in links the activity. A numeric 0
    /// would be misleading on a scale that starts at 1, so "no data" is
    /// explicit.
    pub fn correlate(checkins: &[MoodCheckin], activity_id: Uuid) -> Option<ActivityCorrelation> {
        let linked: Vec<&MoodCheckin> = checkins
            .iter()
            .filter(|c| c.activity_ids.contains(&activity_id))
            .collect();

        let average_rating = mean_rating(linked.iter().copied())?;

        Some(ActivityCorrelation {
            activity_id,
            average_rating,
            sample_count: linked.len(),
        })
    }
}

fn mean_rating<'a>(checkins: impl Iterator<Item = &'a MoodCheckin>) -> Option<f64> {
    let mut sum = 0u32;
    let mut count = 0usize;
    for checkin in checkins {
        sum += u32::from(checkin.rating);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(f64::from(sum) / count as f64)
}
