//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/repocat/repocat.toml`
//! 3. Local config: `<dir>/.repocat.toml` (usually the working directory)
//! 4. Environment variables: `REPOCAT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, MissingParentPolicy};
use crate::domain::expand_env_vars;

/// Unified configuration for repocat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Catalog snapshot to load (default: `<data dir>/catalog.toml`)
    pub catalog_path: PathBuf,
    /// Handling of groups whose parent is not in the catalog
    pub missing_parent: MissingParentPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            missing_parent: MissingParentPolicy::default(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub catalog_path: Option<PathBuf>,
    pub missing_parent: Option<MissingParentPolicy>,
}

fn default_catalog_path() -> PathBuf {
    ProjectDirs::from("", "", "repocat")
        .map(|dirs| dirs.data_dir().join("catalog.toml"))
        .unwrap_or_else(|| PathBuf::from("catalog.toml"))
}

/// Get the XDG config directory for repocat.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "repocat").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("repocat.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".repocat.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

fn parse_policy(value: &str) -> Result<MissingParentPolicy, ApplicationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Ok(MissingParentPolicy::Error),
        "detach" => Ok(MissingParentPolicy::Detach),
        other => Err(ApplicationError::Config {
            message: format!(
                "invalid missing_parent '{}' (expected 'error' or 'detach')",
                other
            ),
        }),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            catalog_path: overlay
                .catalog_path
                .clone()
                .unwrap_or_else(|| self.catalog_path.clone()),
            missing_parent: overlay.missing_parent.unwrap_or(self.missing_parent),
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.catalog_path.to_string_lossy().as_ref());
        self.catalog_path = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.repocat.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply REPOCAT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("REPOCAT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("catalog_path") {
            settings.catalog_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("missing_parent") {
            settings.missing_parent = parse_policy(&val)?;
        }

        Ok(settings)
    }

    /// Render as TOML (for `config show`).
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
