//! Domain layer: catalog entities and their invariants
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod clock;
pub mod credential;
pub mod error;
pub mod group;
pub mod repository;
pub mod uri;
pub mod user;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{CredentialId, GitLabCredential, UserRef};
pub use error::{DomainError, DomainResult};
pub use group::RepositoryGroup;
pub use repository::Repository;
pub use user::ApplicationUser;

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~` for the home directory.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
