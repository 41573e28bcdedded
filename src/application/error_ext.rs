//! Error conversion helpers for I/O and snapshot parsing
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read catalog", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for turning TOML decode errors into snapshot errors.
pub trait TomlResultExt<T> {
    fn for_snapshot(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> TomlResultExt<T> for Result<T, toml::de::Error> {
    fn for_snapshot(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Snapshot {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}
