//! Per-reading classification against a threshold pair.

use crate::error::{AlertError, AlertResult};
use crate::reading::{Reading, ReadingSeries};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How the systolic and diastolic comparisons are combined into one verdict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineRule {
    /// Either value at or above its limit is enough.
    #[default]
    Or,
    /// Both values must be at or above their limits.
    And,
}

impl CombineRule {
    pub fn combine(self, high_systolic: bool, high_diastolic: bool) -> bool {
        match self {
            CombineRule::Or => high_systolic || high_diastolic,
            CombineRule::And => high_systolic && high_diastolic,
        }
    }
}

/// A systolic/diastolic limit pair in mmHg. Values equal to a limit count as high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub systolic_limit: i32,
    pub diastolic_limit: i32,
}

impl ThresholdSet {
    pub const fn new(systolic_limit: i32, diastolic_limit: i32) -> Self {
        Self {
            systolic_limit,
            diastolic_limit,
        }
    }

    /// Compares integer values from a single reading.
    pub fn is_high(&self, systolic: i32, diastolic: i32, combine: CombineRule) -> bool {
        combine.combine(
            systolic >= self.systolic_limit,
            diastolic >= self.diastolic_limit,
        )
    }

    /// Compares mean values, which need not be whole numbers.
    pub fn is_mean_high(&self, systolic: f64, diastolic: f64, combine: CombineRule) -> bool {
        combine.combine(
            systolic >= f64::from(self.systolic_limit),
            diastolic >= f64::from(self.diastolic_limit),
        )
    }
}

/// High/not-high labels aligned index-for-index with the series they were computed from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    labels: Vec<bool>,
}

impl Classification {
    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Copy of these labels with every position outside `range` cleared to not-high.
    ///
    /// Used to restrict follow-up checks to a window while still letting the first reading
    /// after the window count as the follow-up.
    pub fn only_within(&self, range: Range<usize>) -> Classification {
        let labels = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, &high)| high && range.contains(&i))
            .collect();
        Classification { labels }
    }

    pub fn high_count(&self) -> usize {
        self.labels.iter().filter(|&&high| high).count()
    }
}

impl From<Vec<bool>> for Classification {
    fn from(labels: Vec<bool>) -> Self {
        Self { labels }
    }
}

/// Labels every reading in `series` as high or not.
///
/// # Errors
///
/// Returns [`AlertError::InvalidReading`] for the first reading with a non-positive systolic
/// or diastolic value. No label is produced for a partially valid series.
pub fn classify(
    series: &ReadingSeries<'_>,
    thresholds: &ThresholdSet,
    combine: CombineRule,
) -> AlertResult<Classification> {
    let labels = series
        .readings()
        .iter()
        .enumerate()
        .map(|(index, reading)| {
            validate_reading(index, reading)?;
            Ok(thresholds.is_high(reading.systolic(), reading.diastolic(), combine))
        })
        .collect::<AlertResult<Vec<bool>>>()?;

    Ok(Classification { labels })
}

fn validate_reading(index: usize, reading: &Reading) -> AlertResult<()> {
    if reading.systolic() <= 0 || reading.diastolic() <= 0 {
        return Err(AlertError::InvalidReading {
            index,
            systolic: reading.systolic(),
            diastolic: reading.diastolic(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::test_support::readings_at_minutes;

    const EMERGENCY: ThresholdSet = ThresholdSet::new(180, 110);

    #[test]
    fn or_rule_flags_either_limit() {
        let readings = readings_at_minutes(&[
            (0, 185, 100),
            (10, 150, 112),
            (20, 179, 109),
            (30, 180, 110),
        ]);
        let series = ReadingSeries::new(&readings).unwrap();

        let labels = classify(&series, &EMERGENCY, CombineRule::Or).expect("classify");
        assert_eq!(labels.labels(), &[true, true, false, true]);
        assert_eq!(labels.high_count(), 3);
    }

    #[test]
    fn and_rule_requires_both_limits() {
        let readings = readings_at_minutes(&[(0, 185, 100), (10, 150, 112), (20, 181, 111)]);
        let series = ReadingSeries::new(&readings).unwrap();

        let labels = classify(&series, &EMERGENCY, CombineRule::And).expect("classify");
        assert_eq!(labels.labels(), &[false, false, true]);
    }

    #[test]
    fn empty_series_yields_empty_classification() {
        let series = ReadingSeries::new(&[]).unwrap();
        let labels = classify(&series, &EMERGENCY, CombineRule::Or).expect("classify");
        assert!(labels.is_empty());
    }

    #[test]
    fn rejects_non_positive_values() {
        let readings = readings_at_minutes(&[(0, 120, 80), (10, 0, 80), (20, 120, -1)]);
        let series = ReadingSeries::new(&readings).unwrap();

        let err = classify(&series, &EMERGENCY, CombineRule::Or).expect_err("invalid reading");
        assert!(matches!(
            err,
            AlertError::InvalidReading {
                index: 1,
                systolic: 0,
                diastolic: 80
            }
        ));
    }

    #[test]
    fn only_within_clears_labels_outside_range() {
        let labels = Classification::from(vec![true, true, false, true, true]);
        assert_eq!(
            labels.only_within(1..4).labels(),
            &[false, true, false, true, false]
        );
        assert_eq!(labels.only_within(3..3).high_count(), 0);
    }

    #[test]
    fn mean_comparison_is_inclusive() {
        let monthly = ThresholdSet::new(140, 90);
        assert!(monthly.is_mean_high(140.0, 60.0, CombineRule::Or));
        assert!(!monthly.is_mean_high(139.9, 89.9, CombineRule::Or));
        assert!(!monthly.is_mean_high(145.0, 85.0, CombineRule::And));
        assert!(monthly.is_mean_high(145.0, 90.0, CombineRule::And));
    }
}
