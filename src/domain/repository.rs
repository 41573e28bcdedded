//! Repositories: named resources owned by exactly one group.

use std::sync::Arc;

use crate::domain::error::{required, DomainResult};
use crate::domain::group::RepositoryGroup;

/// A repository in the catalog. Immutable once created.
#[derive(Debug, Clone)]
pub struct Repository {
    id: String,
    name: String,
    group_id: String,
    group: Arc<RepositoryGroup>,
    url: String,
}

impl Repository {
    /// Create a repository bound to `group`.
    ///
    /// All strings are trimmed and must be non-empty. `group_id` is always
    /// copied from the group itself.
    pub fn create(
        id: &str,
        name: &str,
        group: Arc<RepositoryGroup>,
        url: &str,
    ) -> DomainResult<Self> {
        let id = required("id", id)?;
        let name = required("name", name)?;
        let url = required("url", url)?;

        Ok(Self {
            id,
            name,
            group_id: group.id().to_string(),
            group,
            url,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn group(&self) -> &Arc<RepositoryGroup> {
        &self.group
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
