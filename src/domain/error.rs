//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller supplied an empty or malformed value.
    #[error("invalid argument '{field}': {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    /// Operation is forbidden given the current entity state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl DomainError {
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Trim `value` and reject it when nothing is left.
pub(crate) fn required(field: &'static str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_argument(
            field,
            "cannot be empty or whitespace",
        ));
    }
    Ok(trimmed.to_string())
}

/// Blank-to-unset normalization for optional text.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
