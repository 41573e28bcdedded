//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::CatalogService;
use crate::config::Settings;
use crate::domain::{Clock, SystemClock};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Time source for audit timestamps
    pub clock: Arc<dyn Clock>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(SystemClock))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            clock,
        }
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(
            self.fs.clone(),
            self.clock.clone(),
            self.settings.missing_parent,
        )
    }
}
