//! Missed-monitoring detection.

use crate::classifier::Classification;
use crate::reading::ReadingSeries;
use chrono::{DateTime, Duration, Utc};

/// Returns true if any two consecutive readings are more than `max_gap` apart.
///
/// Only adjacent deltas matter; a gap of exactly `max_gap` is tolerated.
pub fn has_monitoring_gap(series: &ReadingSeries<'_>, max_gap: Duration) -> bool {
    let found = series.readings().windows(2).position(|pair| {
        let delta = pair[1].timestamp() - pair[0].timestamp();
        delta > max_gap
    });

    if let Some(index) = found {
        tracing::debug!(after_index = index, "monitoring gap found");
        return true;
    }
    false
}

/// Returns true if a high reading was not followed up within `follow_up_window`.
///
/// The last reading of the series is judged against `now`: it only counts as missed once
/// `follow_up_window` has elapsed without a further reading.
pub fn has_missed_follow_up(
    series: &ReadingSeries<'_>,
    classification: &Classification,
    follow_up_window: Duration,
    now: DateTime<Utc>,
) -> bool {
    let readings = series.readings();

    for (index, (reading, &high)) in readings.iter().zip(classification.labels()).enumerate() {
        if !high {
            continue;
        }

        let next_time = readings.get(index + 1).map(|next| next.timestamp());
        let waited = next_time.unwrap_or(now) - reading.timestamp();

        if waited > follow_up_window {
            tracing::debug!(
                index,
                waited_minutes = waited.num_minutes(),
                has_next = next_time.is_some(),
                "high reading without timely follow-up"
            );
            return true;
        }
    }

    false
}
