use std::io;
use thiserror::Error;

/// Rejected input. Nothing is mutated on this path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("unknown priority '{0}' (expected highest, medium or lowest)")]
    UnknownPriority(String),

    #[error("unknown status '{0}' (expected pending, inProgress or completed)")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field} '{format}': not a valid strftime format")]
    InvalidFormat { field: &'static str, format: String },
}

pub type Result<T> = std::result::Result<T, PlannerError>;
