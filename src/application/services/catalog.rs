//! Catalog loading service
//!
//! Reads a catalog snapshot, rebuilds every entity through its factory, and
//! rehydrates group parents and repository owners.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::error_ext::{IoResultExt, TomlResultExt};
use crate::application::hierarchy::{GroupHierarchy, MissingParentPolicy};
use crate::application::snapshot::{CatalogSnapshot, UserRecord};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ApplicationUser, Clock, Repository, RepositoryGroup};
use crate::infrastructure::traits::FileSystem;

/// A fully loaded catalog.
#[derive(Debug)]
pub struct Catalog {
    pub groups: GroupHierarchy,
    pub repositories: Vec<Repository>,
    pub users: Vec<ApplicationUser>,
}

impl Catalog {
    /// Repositories owned by `group_id`, optionally including subgroups.
    pub fn repositories_in(
        &self,
        group_id: &str,
        include_subgroups: bool,
    ) -> ApplicationResult<Vec<&Repository>> {
        if self.groups.get(group_id).is_none() {
            return Err(ApplicationError::GroupNotFound(group_id.to_string()));
        }
        let ids: HashSet<&str> = if include_subgroups {
            self.groups
                .descendants(group_id)
                .iter()
                .map(|g| g.id())
                .collect()
        } else {
            HashSet::from([group_id])
        };
        Ok(self
            .repositories
            .iter()
            .filter(|r| ids.contains(r.group_id()))
            .collect())
    }

    pub fn user_by_name(&self, user_name: &str) -> Option<&ApplicationUser> {
        self.users.iter().find(|u| u.user_name() == user_name)
    }
}

/// Service for loading catalogs.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    missing_parent: MissingParentPolicy,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        missing_parent: MissingParentPolicy,
    ) -> Self {
        Self {
            fs,
            clock,
            missing_parent,
        }
    }

    /// Read and build the catalog stored at `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Catalog> {
        let missing = if !self.fs.exists(path) {
            Some("file not found")
        } else if !self.fs.is_file(path) {
            Some("not a regular file")
        } else {
            None
        };
        if let Some(message) = missing {
            return Err(ApplicationError::Snapshot {
                path: path.to_path_buf(),
                message: message.into(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read catalog", path)?;
        let snapshot = CatalogSnapshot::from_toml(&content).for_snapshot(path)?;
        self.build(snapshot)
    }

    /// Build a catalog from an already-parsed snapshot.
    pub fn build(&self, snapshot: CatalogSnapshot) -> ApplicationResult<Catalog> {
        let groups = snapshot
            .groups
            .iter()
            .map(|g| {
                RepositoryGroup::create(&g.id, &g.name, g.parent.as_deref(), g.url.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let groups = GroupHierarchy::build(groups, self.missing_parent)?;

        let mut seen = HashSet::new();
        let mut repositories = Vec::with_capacity(snapshot.repositories.len());
        for record in &snapshot.repositories {
            let group = groups
                .get(record.group.trim())
                .cloned()
                .ok_or_else(|| ApplicationError::UnknownGroup {
                    repository: record.id.clone(),
                    group: record.group.clone(),
                })?;
            let repository = Repository::create(&record.id, &record.name, group, &record.url)?;
            if !seen.insert(repository.id().to_string()) {
                return Err(ApplicationError::DuplicateId {
                    kind: "repository",
                    id: repository.id().to_string(),
                });
            }
            repositories.push(repository);
        }

        let mut user_ids = HashSet::new();
        let mut user_names = HashSet::new();
        let mut users = Vec::with_capacity(snapshot.users.len());
        for record in &snapshot.users {
            let user = self.build_user(record)?;
            if !user_ids.insert(user.id().to_string()) {
                return Err(ApplicationError::DuplicateId {
                    kind: "user",
                    id: user.id().to_string(),
                });
            }
            if !user_names.insert(user.user_name().to_string()) {
                return Err(ApplicationError::DuplicateId {
                    kind: "user name",
                    id: user.user_name().to_string(),
                });
            }
            users.push(user);
        }

        debug!(
            groups = groups.len(),
            repositories = repositories.len(),
            users = users.len(),
            "catalog loaded"
        );
        Ok(Catalog {
            groups,
            repositories,
            users,
        })
    }

    fn build_user(&self, record: &UserRecord) -> ApplicationResult<ApplicationUser> {
        let mut user = ApplicationUser::create_with_clock(
            &record.user_name,
            &record.email,
            &record.full_name,
            self.clock.clone(),
        )?;
        if let Some(id) = &record.id {
            user = user.with_id(id)?;
        }
        if record.display_name.is_some() || record.bio.is_some() {
            user.update_profile(
                &record.full_name,
                record.display_name.as_deref(),
                record.bio.as_deref(),
            )?;
        }
        if record.avatar_url.is_some() {
            user.set_avatar(record.avatar_url.as_deref());
        }
        if !record.active {
            user.deactivate();
        }
        for credential in &record.credentials {
            user.add_gitlab_credential(
                &credential.name,
                &credential.encrypted_access_token,
                credential.gitlab_username.as_deref(),
            )?;
            if let Some(id) = credential.id {
                user.assign_gitlab_credential_id(&credential.name, id)?;
            }
        }
        Ok(user)
    }
}
