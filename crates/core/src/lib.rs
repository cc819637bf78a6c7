//! # BPA Core
//!
//! Alert evaluation engine for home blood pressure monitoring.
//!
//! Given one patient's readings in timestamp order, the engine raises three alerts:
//! - **Emergency high**: a run of consecutive emergency-level readings inside a short time span,
//!   not followed by any lower reading
//! - **Monthly high**: the mean over the trailing window reaches the monthly thresholds
//! - **Missed reading**: a long gap between readings, or an emergency-level reading without a
//!   timely follow-up
//!
//! **No I/O**: parsing readings from files, printing reports, and reading the wall clock belong
//! to callers such as `bpa-readings` and the `bpa` binary. Every evaluation takes `now` as an
//! argument and returns a fresh [`AlertVector`].

pub mod classifier;
pub mod config;
pub mod constants;
pub mod emergency;
pub mod error;
pub mod evaluator;
pub mod gap;
pub mod reading;
pub mod window;

pub use classifier::{classify, Classification, CombineRule, ThresholdSet};
pub use config::{load_config, AlertConfig, HistoryScope};
pub use emergency::detect_emergency;
pub use error::{AlertError, AlertResult};
pub use evaluator::{evaluate, AlertEvaluator, AlertVector};
pub use gap::{has_missed_follow_up, has_monitoring_gap};
pub use reading::{Reading, ReadingSeries};
pub use window::{
    is_monthly_high, is_window_high, mean_pressure, MeanPressure, ReadingWindow, WindowMode,
};

// Re-export value types so callers need a single dependency
pub use bpa_types::{BloodPressure, PatientId};
