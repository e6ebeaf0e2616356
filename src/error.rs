//! Error types for the empower crate

use thiserror::Error;

/// Main error type for the empower crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no plan found: {reason}")]
    PlanNotFound { reason: String },

    #[error("corrupt policy file '{policy}': {reason}")]
    CorruptPolicyFile { policy: String, reason: String },

    #[error("invalid phase option '{phase}' (valid options are '-L' and '-E')")]
    InvalidPhase { phase: String },

    #[error("no 'define' line found in '{path}'")]
    MissingDescriptionMarker { path: String },

    #[error("no legal actions available in state '{state}'")]
    NoLegalActions { state: String },

    #[error("action '{action}' is not legal in state '{state}'")]
    IllegalAction { action: String, state: String },

    #[error("simulator failure: {message}")]
    Simulator { message: String },

    #[error("simulator protocol error: {message}")]
    Protocol { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
