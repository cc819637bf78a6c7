//! Sustained-high emergency detection.
//!
//! An emergency is a run of consecutive high readings, short enough in time, that is never
//! followed by a reading below the emergency thresholds. A single later low reading clears every
//! run that precedes it, so only runs starting after the last low reading can be accepted.

use crate::classifier::Classification;
use crate::reading::ReadingSeries;
use chrono::Duration;

/// Returns true if `series` contains an accepted emergency run.
///
/// Candidate runs are windows of exactly `run_length` consecutive high labels. They are
/// considered in order of their first index, overlapping windows included. A candidate starting
/// at `i` is accepted when the span from reading `i` to reading `i + run_length - 1` is at most
/// `window_span` and no label from `i` onward is low.
///
/// Series shorter than `run_length`, and a `run_length` of zero, never raise an emergency.
pub fn detect_emergency(
    series: &ReadingSeries<'_>,
    classification: &Classification,
    window_span: Duration,
    run_length: usize,
) -> bool {
    if run_length == 0 {
        return false;
    }

    let readings = series.readings();
    let labels = classification.labels();
    let n = readings.len().min(labels.len());
    if n < run_length {
        return false;
    }

    let labels = &labels[..n];
    let last_low = labels.iter().rposition(|&high| !high);

    let mut run = 0usize;
    for (end, &high) in labels.iter().enumerate() {
        if !high {
            run = 0;
            continue;
        }
        run += 1;
        if run < run_length {
            continue;
        }

        let start = end + 1 - run_length;
        let elapsed = readings[end].timestamp() - readings[start].timestamp();

        if last_low.is_some_and(|low| low > start) {
            tracing::debug!(start, end, "emergency candidate nullified by a later low reading");
            continue;
        }
        if elapsed > window_span {
            tracing::debug!(
                start,
                end,
                elapsed_minutes = elapsed.num_minutes(),
                "emergency candidate outside time window"
            );
            continue;
        }

        tracing::debug!(start, end, "emergency run accepted");
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, CombineRule, ThresholdSet};
    use crate::reading::test_support::readings_at_minutes;
    use crate::reading::{Reading, ReadingSeries};
    use chrono::Duration;

    const EMERGENCY: ThresholdSet = ThresholdSet::new(180, 110);

    fn detect(readings: &[Reading]) -> bool {
        let series = ReadingSeries::new(readings).unwrap();
        let labels = classify(&series, &EMERGENCY, CombineRule::Or).unwrap();
        detect_emergency(&series, &labels, Duration::hours(1), 3)
    }

    #[test]
    fn three_highs_within_an_hour_raise_emergency() {
        let readings = readings_at_minutes(&[(0, 185, 115), (20, 185, 115), (40, 185, 115)]);
        assert!(detect(&readings));
    }

    #[test]
    fn later_low_reading_nullifies_emergency() {
        let readings = readings_at_minutes(&[
            (0, 185, 115),
            (20, 185, 115),
            (40, 185, 115),
            (50, 120, 80),
        ]);
        assert!(!detect(&readings));
    }

    #[test]
    fn low_long_after_run_still_nullifies() {
        let readings = readings_at_minutes(&[
            (0, 185, 115),
            (10, 190, 100),
            (20, 170, 112),
            (30, 181, 111),
            (60 * 24 * 5, 118, 76),
        ]);
        assert!(!detect(&readings));
    }

    #[test]
    fn run_spanning_exactly_the_window_is_accepted() {
        let readings = readings_at_minutes(&[(0, 185, 115), (30, 185, 115), (60, 185, 115)]);
        assert!(detect(&readings));
    }

    #[test]
    fn run_spanning_just_over_the_window_is_rejected() {
        let mut readings = readings_at_minutes(&[(0, 185, 115), (30, 185, 115)]);
        readings.push(crate::reading::test_support::reading_at(
            Duration::minutes(60) + Duration::seconds(1),
            185,
            115,
        ));
        assert!(!detect(&readings));
    }

    #[test]
    fn overlapping_run_is_found_after_slow_start() {
        // The window starting at 0 spans two hours; the one starting at 100 fits.
        let readings = readings_at_minutes(&[
            (0, 185, 115),
            (100, 185, 115),
            (120, 185, 115),
            (140, 185, 115),
        ]);
        assert!(detect(&readings));
    }

    #[test]
    fn run_after_last_low_is_accepted() {
        let readings = readings_at_minutes(&[
            (0, 185, 115),
            (10, 185, 115),
            (20, 185, 115),
            (30, 120, 80),
            (40, 185, 115),
            (50, 185, 115),
            (60, 185, 115),
        ]);
        assert!(detect(&readings));
    }

    #[test]
    fn interrupted_highs_do_not_form_a_run() {
        let readings = readings_at_minutes(&[
            (0, 185, 115),
            (10, 185, 115),
            (20, 120, 80),
            (30, 185, 115),
            (40, 185, 115),
        ]);
        assert!(!detect(&readings));
    }

    #[test]
    fn short_series_never_raises_emergency() {
        assert!(!detect(&[]));
        assert!(!detect(&readings_at_minutes(&[(0, 185, 115)])));
        assert!(!detect(&readings_at_minutes(&[(0, 185, 115), (5, 185, 115)])));
    }

    #[test]
    fn honours_custom_run_length() {
        let readings = readings_at_minutes(&[(0, 185, 115), (5, 185, 115)]);
        let series = ReadingSeries::new(&readings).unwrap();
        let labels = classify(&series, &EMERGENCY, CombineRule::Or).unwrap();

        assert!(detect_emergency(&series, &labels, Duration::hours(1), 2));
        assert!(!detect_emergency(&series, &labels, Duration::hours(1), 0));
    }
}
