//! # Error Types Module
//!
//! Errors raised by the glue around the planning core: persistence, the
//! external solver, configuration and request files. The core itself never
//! fails; it degrades to well-defined fallback values.

/// Errors from the outer layers of the planner
#[derive(Debug)]
pub enum PlannerError {
    /// Database access failed
    Database(sqlx::Error),
    /// The solver service was unreachable or returned no usable plan
    Solver(String),
    /// A request failed validation before being sent
    InvalidRequest(String),
    /// Payload (de)serialization failed
    Serialization(serde_json::Error),
    /// Reading input failed
    Io(std::io::Error),
    /// Environment configuration is invalid
    Config(String),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::Database(err) => write!(f, "Database error: {err}"),
            PlannerError::Solver(msg) => write!(f, "Solver error: {msg}"),
            PlannerError::InvalidRequest(msg) => write!(f, "Invalid request: {msg}"),
            PlannerError::Serialization(err) => write!(f, "Serialization error: {err}"),
            PlannerError::Io(err) => write!(f, "I/O error: {err}"),
            PlannerError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::Database(err) => Some(err),
            PlannerError::Serialization(err) => Some(err),
            PlannerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for PlannerError {
    fn from(err: sqlx::Error) -> Self {
        PlannerError::Database(err)
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::Solver(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Serialization(err)
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::Io(err)
    }
}
