//! Repository groups: named nodes in the catalog hierarchy.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::domain::error::{optional, required, DomainError, DomainResult};
use crate::domain::uri;

/// A named node in the group tree.
///
/// `parent_group_id` is the source of truth for the hierarchy. The resolved
/// `parent_group` reference is a cache filled in by a loader and dropped
/// whenever the id changes.
#[derive(Debug, Clone)]
pub struct RepositoryGroup {
    id: String,
    name: String,
    parent_group_id: Option<String>,
    parent_group: Option<Arc<RepositoryGroup>>,
    url: Option<String>,
}

impl RepositoryGroup {
    /// Create a group.
    ///
    /// `id` and `name` are trimmed and must not be blank. A blank
    /// `parent_group_id` means root. A blank `url` means no URL.
    pub fn create(
        id: &str,
        name: &str,
        parent_group_id: Option<&str>,
        url: Option<&str>,
    ) -> DomainResult<Self> {
        let id = required("id", id)?;
        let name = required("name", name)?;
        let parent_group_id = optional(parent_group_id);
        if parent_group_id.as_deref() == Some(id.as_str()) {
            return Err(DomainError::invalid_operation(format!(
                "group '{}' cannot be its own parent",
                id
            )));
        }
        let url = uri::normalize_optional("url", url)?;

        Ok(Self {
            id,
            name,
            parent_group_id,
            parent_group: None,
            url,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_group_id(&self) -> Option<&str> {
        self.parent_group_id.as_deref()
    }

    /// Resolved parent, if a loader has rehydrated it.
    pub fn parent_group(&self) -> Option<&Arc<RepositoryGroup>> {
        self.parent_group.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_group_id.is_none()
    }

    /// True when a parent id is set but not yet rehydrated.
    pub fn is_parent_pending(&self) -> bool {
        self.parent_group_id.is_some() && self.parent_group.is_none()
    }

    /// Rename the group. Returns whether the name changed.
    pub fn rename(&mut self, new_name: &str) -> DomainResult<bool> {
        let new_name = required("name", new_name)?;
        if new_name == self.name {
            return Ok(false);
        }
        debug!(group = %self.id, from = %self.name, to = %new_name, "rename group");
        self.name = new_name;
        Ok(true)
    }

    /// Point this group at a new parent. The resolved reference is cleared
    /// and must be rehydrated by the loader.
    pub fn set_parent(&mut self, parent_group_id: &str) -> DomainResult<()> {
        let parent_group_id = required("parent_group_id", parent_group_id)?;
        if parent_group_id == self.id {
            return Err(DomainError::invalid_operation(format!(
                "group '{}' cannot be its own parent",
                self.id
            )));
        }
        debug!(group = %self.id, parent = %parent_group_id, "set parent");
        self.parent_group_id = Some(parent_group_id);
        self.parent_group = None;
        Ok(())
    }

    pub fn clear_parent(&mut self) {
        debug!(group = %self.id, "clear parent");
        self.parent_group_id = None;
        self.parent_group = None;
    }

    /// Replace the URL. Blank input clears it.
    pub fn update_url(&mut self, url: Option<&str>) -> DomainResult<()> {
        self.url = uri::normalize_optional("url", url)?;
        Ok(())
    }

    /// Attach the resolved parent. The group must be the one named by
    /// `parent_group_id`.
    pub fn resolve_parent(&mut self, parent: Arc<RepositoryGroup>) -> DomainResult<()> {
        match self.parent_group_id.as_deref() {
            Some(expected) if expected == parent.id() => {
                self.parent_group = Some(parent);
                Ok(())
            }
            Some(expected) => Err(DomainError::invalid_operation(format!(
                "group '{}' expects parent '{}', got '{}'",
                self.id,
                expected,
                parent.id()
            ))),
            None => Err(DomainError::invalid_operation(format!(
                "group '{}' is a root group and has no parent to resolve",
                self.id
            ))),
        }
    }
}

impl PartialEq for RepositoryGroup {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RepositoryGroup {}

impl Hash for RepositoryGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RepositoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
