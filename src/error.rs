use thiserror::Error;

/// Driver tracker error types
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid fix: lat={latitude}, lon={longitude}")]
    InvalidFix { latitude: f64, longitude: f64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
