//! Error types for near_kpiece

use thiserror::Error;

/// Main error type for the planner
#[derive(Error, Debug)]
pub enum PlanningError {
    /// No start state survived seeding
    #[error("Invalid start: there are no valid initial states")]
    InvalidStart,
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
    /// A worker thread panicked during a solve
    #[error("Worker thread {0} panicked")]
    WorkerPanicked(usize),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PlanningError {
    fn from(e: toml::de::Error) -> Self {
        PlanningError::Config(e.to_string())
    }
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
