//! Reading logs exported from home blood pressure monitors.
//!
//! This crate is the input side of the alert engine. It turns a CSV export with the columns
//! `ID`, `TimeStamp` and `BloodPressure` into typed [`Reading`]s sorted by timestamp, which is
//! the order `bpa-core` requires.
//!
//! This crate focuses on:
//! - CSV decoding with per-row error reporting
//! - day-first timestamp parsing (`31/01/2024 08:15` is the 31st of January)
//! - `SYS/DIA` pressure parsing
//!
//! Clinical rules do not live here; see `bpa_core`.

mod reading_log;
mod timestamp;

pub use reading_log::ReadingLog;
pub use timestamp::parse_timestamp;

// Re-export the reading type handed to the engine
pub use bpa_core::Reading;

/// Errors returned while reading a log.
///
/// Row numbers count data rows from 1, excluding the header.
#[derive(Debug, thiserror::Error)]
pub enum ReadingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognised timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: {source}")]
    InvalidPressure {
        row: usize,
        #[source]
        source: bpa_types::PressureError,
    },

    #[error("row {row}: {source}")]
    InvalidPatientId {
        row: usize,
        #[source]
        source: bpa_types::PatientIdError,
    },
}

/// Type alias for Results that can fail with a [`ReadingsError`].
pub type ReadingsResult<T> = Result<T, ReadingsError>;
