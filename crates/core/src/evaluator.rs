//! Alert evaluation for a single patient.
//!
//! This module composes the classifier and the three detectors into the final alert vector:
//! - slot 0: sustained emergency-level readings
//! - slot 1: high mean over the trailing window
//! - slot 2: missed monitoring (a long gap, or a high reading without timely follow-up)

use crate::classifier::classify;
use crate::config::{AlertConfig, HistoryScope};
use crate::emergency::detect_emergency;
use crate::error::AlertResult;
use crate::gap::{has_missed_follow_up, has_monitoring_gap};
use crate::reading::{Reading, ReadingSeries};
use crate::window::{is_window_high, ReadingWindow};
use bpa_types::PatientId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// The three alerts raised for one patient.
///
/// A fresh value is returned by every evaluation; nothing is accumulated between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlertVector {
    pub emergency_high: bool,
    pub monthly_high: bool,
    pub missed_reading: bool,
}

impl AlertVector {
    /// Slots in the fixed order emergency, monthly, missed.
    pub fn as_array(&self) -> [bool; 3] {
        [self.emergency_high, self.monthly_high, self.missed_reading]
    }

    pub fn any(&self) -> bool {
        self.emergency_high || self.monthly_high || self.missed_reading
    }
}

impl From<AlertVector> for [bool; 3] {
    fn from(alerts: AlertVector) -> Self {
        alerts.as_array()
    }
}

/// Evaluates patients against a validated [`AlertConfig`].
///
/// Cloning is cheap and the evaluator holds no mutable state, so one instance can serve any
/// number of patients, on any number of threads.
#[derive(Clone, Debug)]
pub struct AlertEvaluator {
    cfg: Arc<AlertConfig>,
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self {
            cfg: Arc::new(AlertConfig::default()),
        }
    }
}

impl AlertEvaluator {
    /// Creates an evaluator after validating `cfg`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AlertError::InvalidConfig`] if any configured value is unusable.
    pub fn new(cfg: AlertConfig) -> AlertResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    pub fn config(&self) -> &AlertConfig {
        &self.cfg
    }

    /// Evaluates the readings of `patient_id` found in `all_readings`.
    ///
    /// Readings of other patients are skipped. The remaining readings must already be in
    /// ascending timestamp order. A patient without readings gets an all-false vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the patient's readings are out of order or contain a non-positive
    /// pressure value.
    pub fn evaluate(
        &self,
        all_readings: &[Reading],
        patient_id: &PatientId,
        now: DateTime<Utc>,
    ) -> AlertResult<AlertVector> {
        let own: Vec<Reading> = all_readings
            .iter()
            .filter(|r| r.patient_id() == patient_id)
            .cloned()
            .collect();

        if own.is_empty() {
            tracing::debug!(patient = %patient_id, "no readings for patient");
            return Ok(AlertVector::default());
        }

        let alerts = self.evaluate_series(&ReadingSeries::new(&own)?, now)?;
        tracing::info!(
            patient = %patient_id,
            readings = own.len(),
            emergency_high = alerts.emergency_high,
            monthly_high = alerts.monthly_high,
            missed_reading = alerts.missed_reading,
            "evaluated alerts"
        );
        Ok(alerts)
    }

    /// Evaluates an already filtered, ordered, single-patient series.
    pub fn evaluate_series(
        &self,
        series: &ReadingSeries<'_>,
        now: DateTime<Utc>,
    ) -> AlertResult<AlertVector> {
        if series.is_empty() {
            return Ok(AlertVector::default());
        }

        let cfg = &self.cfg;
        let labels = classify(series, &cfg.emergency_thresholds, cfg.emergency_combine)?;
        tracing::debug!(
            readings = labels.len(),
            high = labels.high_count(),
            "classified readings"
        );

        let emergency_high = detect_emergency(
            series,
            &labels,
            cfg.emergency_window,
            cfg.emergency_run_length,
        );

        let window = ReadingWindow::resolve(cfg.window_mode, now, cfg.monthly_window_days);
        let monthly_high = is_window_high(
            series,
            &window,
            &cfg.monthly_thresholds,
            cfg.monthly_combine,
        );

        let gap_series = match cfg.gap_scope {
            HistoryScope::TrailingWindow => window.apply(series),
            HistoryScope::FullHistory => *series,
        };
        let monitoring_gap = has_monitoring_gap(&gap_series, cfg.monitoring_gap_limit);

        let missed_follow_up = !monitoring_gap
            && match cfg.follow_up_scope {
                HistoryScope::FullHistory => {
                    has_missed_follow_up(series, &labels, cfg.follow_up_window, now)
                }
                HistoryScope::TrailingWindow => has_missed_follow_up(
                    series,
                    &labels.only_within(window.index_range(series)),
                    cfg.follow_up_window,
                    now,
                ),
            };
        let missed_reading = monitoring_gap || missed_follow_up;

        Ok(AlertVector {
            emergency_high,
            monthly_high,
            missed_reading,
        })
    }
}

/// Evaluates `patient_id` with `config`, validating the configuration first.
pub fn evaluate(
    all_readings: &[Reading],
    patient_id: &PatientId,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> AlertResult<AlertVector> {
    AlertEvaluator::new(config.clone())?.evaluate(all_readings, patient_id, now)
}
