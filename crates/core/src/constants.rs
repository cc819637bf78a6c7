//! Default clinical limits and time bounds used by the alert engine.
//!
//! Every value here can be overridden through [`crate::AlertConfig`]; these are only the
//! starting point when nothing else is configured.

/// Systolic value (mmHg) at or above which a single reading counts as an emergency-level high.
pub const EMERGENCY_SYSTOLIC_LIMIT: i32 = 180;

/// Diastolic value (mmHg) at or above which a single reading counts as an emergency-level high.
pub const EMERGENCY_DIASTOLIC_LIMIT: i32 = 110;

/// Mean systolic value (mmHg) over the trailing window that raises the monthly-high alert.
pub const MONTHLY_SYSTOLIC_LIMIT: i32 = 140;

/// Mean diastolic value (mmHg) over the trailing window that raises the monthly-high alert.
pub const MONTHLY_DIASTOLIC_LIMIT: i32 = 90;

/// Number of consecutive high readings that make up an emergency run.
pub const EMERGENCY_RUN_LENGTH: usize = 3;

/// Maximum span, first to last reading, of an emergency run.
pub const EMERGENCY_WINDOW_MINUTES: i64 = 60;

/// Largest tolerated gap between two consecutive readings.
pub const MONITORING_GAP_DAYS: i64 = 7;

/// Time allowed for a follow-up reading after an emergency-level high.
pub const FOLLOW_UP_WINDOW_MINUTES: i64 = 60;

/// Length of the trailing window used for the monthly mean.
pub const MONTHLY_WINDOW_DAYS: u32 = 30;

/// Upper bound, in days, for every configured time span (about 100 years).
pub const MAX_CONFIG_SPAN_DAYS: i64 = 36_525;

/// Environment variable the runner consults for a configuration file path.
pub const CONFIG_PATH_ENV: &str = "BPA_CONFIG";
