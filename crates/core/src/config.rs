//! Alert engine configuration.
//!
//! Configuration is resolved once (defaults, optionally overlaid by a YAML file) and then handed
//! to [`crate::AlertEvaluator`]. The engine never reads environment variables or files while
//! evaluating, so results depend only on the readings, `now`, and this value.

use crate::classifier::{CombineRule, ThresholdSet};
use crate::constants::{
    EMERGENCY_DIASTOLIC_LIMIT, EMERGENCY_RUN_LENGTH, EMERGENCY_SYSTOLIC_LIMIT,
    EMERGENCY_WINDOW_MINUTES, FOLLOW_UP_WINDOW_MINUTES, MAX_CONFIG_SPAN_DAYS, MONITORING_GAP_DAYS,
    MONTHLY_DIASTOLIC_LIMIT, MONTHLY_SYSTOLIC_LIMIT, MONTHLY_WINDOW_DAYS,
};
use crate::error::{AlertError, AlertResult};
use crate::window::WindowMode;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which part of a patient's history a missed-reading check looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryScope {
    /// Only readings inside the trailing window used for the monthly mean.
    TrailingWindow,
    /// Every reading supplied for the patient.
    FullHistory,
}

/// Complete set of tunables for one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertConfig {
    pub emergency_thresholds: ThresholdSet,
    pub monthly_thresholds: ThresholdSet,
    pub emergency_combine: CombineRule,
    pub monthly_combine: CombineRule,
    pub emergency_run_length: usize,
    pub emergency_window: Duration,
    pub monitoring_gap_limit: Duration,
    pub follow_up_window: Duration,
    pub monthly_window_days: u32,
    pub window_mode: WindowMode,
    pub gap_scope: HistoryScope,
    pub follow_up_scope: HistoryScope,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            emergency_thresholds: ThresholdSet::new(
                EMERGENCY_SYSTOLIC_LIMIT,
                EMERGENCY_DIASTOLIC_LIMIT,
            ),
            monthly_thresholds: ThresholdSet::new(MONTHLY_SYSTOLIC_LIMIT, MONTHLY_DIASTOLIC_LIMIT),
            emergency_combine: CombineRule::Or,
            monthly_combine: CombineRule::Or,
            emergency_run_length: EMERGENCY_RUN_LENGTH,
            emergency_window: Duration::minutes(EMERGENCY_WINDOW_MINUTES),
            monitoring_gap_limit: Duration::days(MONITORING_GAP_DAYS),
            follow_up_window: Duration::minutes(FOLLOW_UP_WINDOW_MINUTES),
            monthly_window_days: MONTHLY_WINDOW_DAYS,
            window_mode: WindowMode::TrailingDays,
            gap_scope: HistoryScope::TrailingWindow,
            follow_up_scope: HistoryScope::FullHistory,
        }
    }
}

impl AlertConfig {
    /// Checks that every value is usable.
    ///
    /// Time spans must be non-negative, no longer than [`MAX_CONFIG_SPAN_DAYS`], and whole
    /// multiples of the unit they are written in (minutes, or days for the monitoring gap).
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> AlertResult<()> {
        validate_thresholds("emergency_thresholds", &self.emergency_thresholds)?;
        validate_thresholds("monthly_thresholds", &self.monthly_thresholds)?;

        if self.emergency_run_length == 0 {
            return Err(AlertError::InvalidConfig(
                "emergency_run_length must be at least 1".into(),
            ));
        }
        if self.monthly_window_days == 0 {
            return Err(AlertError::InvalidConfig(
                "monthly_window_days must be at least 1".into(),
            ));
        }
        if i64::from(self.monthly_window_days) > MAX_CONFIG_SPAN_DAYS {
            return Err(AlertError::InvalidConfig(format!(
                "monthly_window_days cannot exceed {MAX_CONFIG_SPAN_DAYS}"
            )));
        }

        let max_span = Duration::days(MAX_CONFIG_SPAN_DAYS);
        for (name, value, unit, unit_name) in [
            ("emergency_window", self.emergency_window, Duration::minutes(1), "minutes"),
            ("monitoring_gap_limit", self.monitoring_gap_limit, Duration::days(1), "days"),
            ("follow_up_window", self.follow_up_window, Duration::minutes(1), "minutes"),
        ] {
            if value < Duration::zero() {
                return Err(AlertError::InvalidConfig(format!(
                    "{name} cannot be negative"
                )));
            }
            if value > max_span {
                return Err(AlertError::InvalidConfig(format!(
                    "{name} cannot exceed {MAX_CONFIG_SPAN_DAYS} days"
                )));
            }
            if !is_whole_multiple(value, unit) {
                return Err(AlertError::InvalidConfig(format!(
                    "{name} must be a whole number of {unit_name}"
                )));
            }
        }

        Ok(())
    }

    /// Parses a YAML configuration document, filling absent fields with defaults.
    ///
    /// Unknown keys and wrongly typed values are rejected, and the error names the path of the
    /// failing field (e.g. `emergency.systolic_limit`).
    pub fn from_yaml_str(yaml_text: &str) -> AlertResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, AlertConfigWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(AlertError::ConfigSchema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        let config = wire.into_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_yaml_file(path: &Path) -> AlertResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AlertError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Renders the configuration in the same YAML shape accepted by [`Self::from_yaml_str`].
    ///
    /// Spans are written in whole minutes or days; a config that passes [`Self::validate`]
    /// renders without loss.
    pub fn to_yaml_string(&self) -> AlertResult<String> {
        serde_yaml::to_string(&AlertConfigWire::from(self)).map_err(AlertError::ConfigSerialization)
    }
}

fn is_whole_multiple(value: Duration, unit: Duration) -> bool {
    match (value.num_nanoseconds(), unit.num_nanoseconds()) {
        (Some(value), Some(unit)) => value % unit == 0,
        _ => false,
    }
}

fn span_from_wire(
    name: &str,
    value: i64,
    to_span: fn(i64) -> Option<Duration>,
) -> AlertResult<Duration> {
    to_span(value).ok_or_else(|| AlertError::InvalidConfig(format!("{name} out of range")))
}

fn validate_thresholds(name: &str, thresholds: &ThresholdSet) -> AlertResult<()> {
    if thresholds.systolic_limit <= 0 || thresholds.diastolic_limit <= 0 {
        return Err(AlertError::InvalidConfig(format!(
            "{name} limits must be positive"
        )));
    }
    Ok(())
}

/// Resolves the effective configuration from an optional file path.
///
/// `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> AlertResult<AlertConfig> {
    match path {
        Some(path) => {
            tracing::info!("loading alert configuration from {}", path.display());
            AlertConfig::from_yaml_file(path)
        }
        None => Ok(AlertConfig::default()),
    }
}

// ============================================================================
// YAML wire model
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    systolic_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diastolic_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    combine: Option<CombineRule>,
}

impl ThresholdWire {
    fn apply(self, thresholds: &mut ThresholdSet, combine: &mut CombineRule) {
        if let Some(v) = self.systolic_limit {
            thresholds.systolic_limit = v;
        }
        if let Some(v) = self.diastolic_limit {
            thresholds.diastolic_limit = v;
        }
        if let Some(v) = self.combine {
            *combine = v;
        }
    }

    fn from_parts(thresholds: &ThresholdSet, combine: CombineRule) -> Self {
        Self {
            systolic_limit: Some(thresholds.systolic_limit),
            diastolic_limit: Some(thresholds.diastolic_limit),
            combine: Some(combine),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AlertConfigWire {
    #[serde(default)]
    emergency: ThresholdWire,
    #[serde(default)]
    monthly: ThresholdWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    emergency_run_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    emergency_window_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    monitoring_gap_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    follow_up_window_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    monthly_window_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    window_mode: Option<WindowMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gap_scope: Option<HistoryScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    follow_up_scope: Option<HistoryScope>,
}

impl AlertConfigWire {
    fn into_config(self) -> AlertResult<AlertConfig> {
        let mut config = AlertConfig::default();

        self.emergency.apply(
            &mut config.emergency_thresholds,
            &mut config.emergency_combine,
        );
        self.monthly
            .apply(&mut config.monthly_thresholds, &mut config.monthly_combine);

        if let Some(v) = self.emergency_run_length {
            config.emergency_run_length = v;
        }
        if let Some(v) = self.emergency_window_minutes {
            config.emergency_window =
                span_from_wire("emergency_window_minutes", v, Duration::try_minutes)?;
        }
        if let Some(v) = self.monitoring_gap_days {
            config.monitoring_gap_limit =
                span_from_wire("monitoring_gap_days", v, Duration::try_days)?;
        }
        if let Some(v) = self.follow_up_window_minutes {
            config.follow_up_window =
                span_from_wire("follow_up_window_minutes", v, Duration::try_minutes)?;
        }
        if let Some(v) = self.monthly_window_days {
            config.monthly_window_days = v;
        }
        if let Some(v) = self.window_mode {
            config.window_mode = v;
        }
        if let Some(v) = self.gap_scope {
            config.gap_scope = v;
        }
        if let Some(v) = self.follow_up_scope {
            config.follow_up_scope = v;
        }

        Ok(config)
    }
}

impl From<&AlertConfig> for AlertConfigWire {
    fn from(config: &AlertConfig) -> Self {
        Self {
            emergency: ThresholdWire::from_parts(
                &config.emergency_thresholds,
                config.emergency_combine,
            ),
            monthly: ThresholdWire::from_parts(&config.monthly_thresholds, config.monthly_combine),
            emergency_run_length: Some(config.emergency_run_length),
            emergency_window_minutes: Some(config.emergency_window.num_minutes()),
            monitoring_gap_days: Some(config.monitoring_gap_limit.num_days()),
            follow_up_window_minutes: Some(config.follow_up_window.num_minutes()),
            monthly_window_days: Some(config.monthly_window_days),
            window_mode: Some(config.window_mode),
            gap_scope: Some(config.gap_scope),
            follow_up_scope: Some(config.follow_up_scope),
        }
    }
}
