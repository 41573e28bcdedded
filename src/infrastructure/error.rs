//! Infrastructure-level errors

use thiserror::Error;

use crate::application::ApplicationError;

/// Failures outside catalog loading proper: process environment and raw I/O.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// Wrap an I/O failure with the action that was attempted.
    pub fn io(action: &'static str, source: std::io::Error) -> Self {
        Self::Io { action, source }
    }
}
