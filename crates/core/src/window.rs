//! Trailing-window resolution and mean-pressure aggregation.

use crate::classifier::{CombineRule, ThresholdSet};
use crate::reading::ReadingSeries;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How "last month" is measured relative to the evaluation instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// The `monthly_window_days` days ending at `now`.
    #[default]
    TrailingDays,
    /// The whole calendar month before the one containing `now`.
    PreviousCalendarMonth,
}

/// A half-open time range. `end == None` means the window runs up to and including the latest
/// reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadingWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl ReadingWindow {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Resolves the window for `mode` as seen from `now`.
    ///
    /// A trailing window reaching before the earliest representable instant starts there.
    pub fn resolve(mode: WindowMode, now: DateTime<Utc>, days: u32) -> Self {
        match mode {
            WindowMode::TrailingDays => Self::starting_at(
                now.checked_sub_signed(Duration::days(i64::from(days)))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
            WindowMode::PreviousCalendarMonth => {
                let (year, month) = if now.month() == 1 {
                    (now.year() - 1, 12)
                } else {
                    (now.year(), now.month() - 1)
                };
                Self {
                    start: month_start(year, month),
                    end: Some(month_start(now.year(), now.month())),
                }
            }
        }
    }

    /// Restricts `series` to the readings inside this window.
    pub fn apply<'a>(&self, series: &ReadingSeries<'a>) -> ReadingSeries<'a> {
        series.between(self.start, self.end)
    }

    /// Index range of `series` covered by this window.
    pub fn index_range(&self, series: &ReadingSeries<'_>) -> Range<usize> {
        series.index_range(self.start, self.end)
    }
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    // Day 1 at midnight exists in every month of every year chrono supports.
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Arithmetic means of the systolic and diastolic values of a set of readings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MeanPressure {
    pub systolic: f64,
    pub diastolic: f64,
    pub count: usize,
}

/// Mean pressure of every reading in `series`, or `None` when it is empty.
pub fn mean_pressure(series: &ReadingSeries<'_>) -> Option<MeanPressure> {
    let readings = series.readings();
    if readings.is_empty() {
        return None;
    }

    let (sys_total, dia_total) = readings.iter().fold((0i64, 0i64), |(s, d), r| {
        (s + i64::from(r.systolic()), d + i64::from(r.diastolic()))
    });
    let count = readings.len();

    Some(MeanPressure {
        systolic: sys_total as f64 / count as f64,
        diastolic: dia_total as f64 / count as f64,
        count,
    })
}

/// Returns true if the mean of the readings inside `window` reaches `thresholds`.
///
/// An empty window never raises the alert.
pub fn is_window_high(
    series: &ReadingSeries<'_>,
    window: &ReadingWindow,
    thresholds: &ThresholdSet,
    combine: CombineRule,
) -> bool {
    let Some(mean) = mean_pressure(&window.apply(series)) else {
        tracing::debug!("no readings in trailing window");
        return false;
    };

    let high = thresholds.is_mean_high(mean.systolic, mean.diastolic, combine);
    tracing::debug!(
        mean_systolic = mean.systolic,
        mean_diastolic = mean.diastolic,
        count = mean.count,
        high,
        "trailing window mean"
    );
    high
}

/// Either-limit check of the mean of all readings at or after `window_start`.
pub fn is_monthly_high(
    series: &ReadingSeries<'_>,
    window_start: DateTime<Utc>,
    thresholds: &ThresholdSet,
) -> bool {
    is_window_high(
        series,
        &ReadingWindow::starting_at(window_start),
        thresholds,
        CombineRule::Or,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::test_support::{base_time, readings_at_minutes};

    const MONTHLY: ThresholdSet = ThresholdSet::new(140, 90);
    const DAY: i64 = 60 * 24;

    #[test]
    fn systolic_mean_alone_trips_or_rule() {
        let readings = readings_at_minutes(&[(0, 140, 80), (DAY, 150, 90), (2 * DAY, 145, 85)]);
        let series = ReadingSeries::new(&readings).unwrap();

        let mean = mean_pressure(&series).expect("non-empty");
        assert_eq!(mean.systolic, 145.0);
        assert_eq!(mean.diastolic, 85.0);
        assert!(is_monthly_high(&series, base_time(), &MONTHLY));
    }

    #[test]
    fn readings_before_window_start_are_ignored() {
        let readings = readings_at_minutes(&[(0, 200, 120), (10 * DAY, 120, 80)]);
        let series = ReadingSeries::new(&readings).unwrap();

        assert!(is_monthly_high(&series, base_time(), &MONTHLY));
        assert!(!is_monthly_high(
            &series,
            base_time() + Duration::days(1),
            &MONTHLY
        ));
    }

    #[test]
    fn empty_window_is_not_high() {
        let readings = readings_at_minutes(&[(0, 200, 120)]);
        let series = ReadingSeries::new(&readings).unwrap();
        assert!(!is_monthly_high(
            &series,
            base_time() + Duration::days(2),
            &MONTHLY
        ));
        assert!(mean_pressure(&ReadingSeries::new(&[]).unwrap()).is_none());
    }

    #[test]
    fn raising_thresholds_needs_higher_mean() {
        let readings = readings_at_minutes(&[(0, 150, 95), (DAY, 150, 95)]);
        let series = ReadingSeries::new(&readings).unwrap();

        assert!(is_monthly_high(&series, base_time(), &MONTHLY));
        assert!(!is_monthly_high(
            &series,
            base_time(),
            &ThresholdSet::new(151, 96)
        ));
    }

    #[test]
    fn and_rule_requires_both_means() {
        let readings = readings_at_minutes(&[(0, 145, 85)]);
        let series = ReadingSeries::new(&readings).unwrap();
        let window = ReadingWindow::starting_at(base_time());

        assert!(is_window_high(&series, &window, &MONTHLY, CombineRule::Or));
        assert!(!is_window_high(&series, &window, &MONTHLY, CombineRule::And));
    }

    #[test]
    fn trailing_days_window_ends_at_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = ReadingWindow::resolve(WindowMode::TrailingDays, now, 30);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(window.end, None);
    }

    #[test]
    fn trailing_days_window_saturates_at_earliest_instant() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = ReadingWindow::resolve(WindowMode::TrailingDays, now, u32::MAX);
        assert_eq!(window.start, DateTime::<Utc>::MIN_UTC);

        let readings = readings_at_minutes(&[(0, 150, 95)]);
        let series = ReadingSeries::new(&readings).unwrap();
        assert_eq!(window.apply(&series).len(), 1);
    }

    #[test]
    fn previous_calendar_month_rolls_over_in_january() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let window = ReadingWindow::resolve(WindowMode::PreviousCalendarMonth, now, 30);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            window.end,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn previous_calendar_month_excludes_current_month() {
        let readings = vec![
            crate::reading::test_support::reading_at(Duration::zero(), 120, 80),
            crate::reading::test_support::reading_at(Duration::days(25), 200, 120),
        ];
        // base time is 2024-03-10; day 25 lands in April.
        let series = ReadingSeries::new(&readings).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap();
        let window = ReadingWindow::resolve(WindowMode::PreviousCalendarMonth, now, 30);

        assert_eq!(window.apply(&series).len(), 1);
        assert!(!is_window_high(&series, &window, &MONTHLY, CombineRule::Or));
    }
}
