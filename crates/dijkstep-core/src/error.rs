//! Error types and exit codes for dijkstep
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args, stepping without a run)
//! - 3: Configuration error (duplicate/unknown vertex, invalid weight, ...)

mod macros;

use thiserror::Error;

/// Exit codes reported by the dijkstep binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Configuration error - malformed graph or source (3)
    Configuration = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while building graphs or driving the engine
#[derive(Error, Debug)]
pub enum DijkstepError {
    // Configuration errors (exit code 3)
    #[error("duplicate vertex: {id}")]
    DuplicateVertex { id: String },

    #[error("unknown vertex: {id}")]
    UnknownVertex { id: String },

    #[error("invalid weight {weight} on edge {from} -> {to} (weights must be finite and non-negative)")]
    InvalidWeight { from: String, to: String, weight: f64 },

    #[error("weight {weight} on edge {from} -> {to} pushes the total edge weight past the largest representable distance")]
    WeightOverflow { from: String, to: String, weight: f64 },

    #[error("no source vertex configured")]
    MissingSource,

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Usage errors (exit code 2)
    #[error("no active run (call run() before step())")]
    NoActiveRun,

    #[error("{0}")]
    UsageError(String),

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DijkstepError {
    /// Create an error for a vertex that is not part of the graph
    pub fn unknown_vertex(id: impl Into<String>) -> Self {
        DijkstepError::UnknownVertex { id: id.into() }
    }

    /// Create an error for a vertex id that is already taken
    pub fn duplicate_vertex(id: impl Into<String>) -> Self {
        DijkstepError::DuplicateVertex { id: id.into() }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        DijkstepError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether this error was caused by malformed graph or engine configuration
    pub fn is_configuration(&self) -> bool {
        self.exit_code() == ExitCode::Configuration
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            DijkstepError::DuplicateVertex { .. }
            | DijkstepError::UnknownVertex { .. }
            | DijkstepError::InvalidWeight { .. }
            | DijkstepError::WeightOverflow { .. }
            | DijkstepError::MissingSource
            | DijkstepError::InvalidValue { .. } => ExitCode::Configuration,

            DijkstepError::NoActiveRun | DijkstepError::UsageError(_) => ExitCode::Usage,

            DijkstepError::Io(_)
            | DijkstepError::Toml(_)
            | DijkstepError::Json(_)
            | DijkstepError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            DijkstepError::DuplicateVertex { .. } => "duplicate_vertex",
            DijkstepError::UnknownVertex { .. } => "unknown_vertex",
            DijkstepError::InvalidWeight { .. } => "invalid_weight",
            DijkstepError::WeightOverflow { .. } => "weight_overflow",
            DijkstepError::MissingSource => "missing_source",
            DijkstepError::InvalidValue { .. } => "invalid_value",
            DijkstepError::NoActiveRun => "no_active_run",
            DijkstepError::UsageError(_) => "usage_error",
            DijkstepError::Io(_) => "io_error",
            DijkstepError::Toml(_) => "toml_error",
            DijkstepError::Json(_) => "json_error",
            DijkstepError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for dijkstep operations
pub type Result<T> = std::result::Result<T, DijkstepError>;
