#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error(
        "invalid reading at index {index}: systolic={systolic}, diastolic={diastolic} (both must be positive)"
    )]
    InvalidReading {
        index: usize,
        systolic: i32,
        diastolic: i32,
    },
    #[error("reading at index {index} is earlier than the reading before it")]
    InvalidInputOrder { index: usize },
    #[error("reading at index {index} belongs to patient {found}, expected {expected}")]
    MixedPatients {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read configuration file {path}: {source}", path = path.display())]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration schema mismatch at {path}: {message}")]
    ConfigSchema { path: String, message: String },
    #[error("failed to serialize configuration: {0}")]
    ConfigSerialization(serde_yaml::Error),
}

pub type AlertResult<T> = std::result::Result<T, AlertError>;
