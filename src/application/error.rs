//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add catalog-loading context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("group '{group}' references unknown parent '{parent}'")]
    UnknownParent { group: String, parent: String },

    #[error("repository '{repository}' references unknown group '{group}'")]
    UnknownGroup { repository: String, group: String },

    #[error("cycle detected in group hierarchy: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("invalid catalog snapshot {}: {message}", path.display())]
    Snapshot { path: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
