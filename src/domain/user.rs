//! Application users and their linked GitLab credentials.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::credential::{CredentialId, GitLabCredential, UserRef};
use crate::domain::error::{optional, required, DomainError, DomainResult};

/// A user profile that owns a private collection of GitLab credentials.
///
/// The credential collection can only be changed through the methods on this
/// type; callers get a read-only slice. Credential names are unique per user,
/// compared case-insensitively.
#[derive(Debug, Clone)]
pub struct ApplicationUser {
    id: String,
    user_name: String,
    email: String,
    security_stamp: String,

    full_name: String,
    display_name: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    is_active: bool,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_seen_at: Option<DateTime<Utc>>,

    gitlab_credentials: Vec<GitLabCredential>,
    clock: Arc<dyn Clock>,
}

impl ApplicationUser {
    /// Create a user stamped with wall-clock time.
    pub fn create(user_name: &str, email: &str, full_name: &str) -> DomainResult<Self> {
        Self::create_with_clock(user_name, email, full_name, Arc::new(SystemClock))
    }

    /// Create a user whose audit timestamps come from `clock`.
    pub fn create_with_clock(
        user_name: &str,
        email: &str,
        full_name: &str,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        let user_name = required("user_name", user_name)?;
        let email = required("email", email)?;
        let full_name = required("full_name", full_name)?;
        let now = clock.now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_name,
            email,
            security_stamp: Uuid::new_v4().to_string(),
            display_name: full_name.clone(),
            full_name,
            bio: None,
            avatar_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_seen_at: None,
            gitlab_credentials: Vec::new(),
            clock,
        })
    }

    /// Adopt an identifier issued by the identity subsystem.
    ///
    /// Attached credentials are rebound to the new id.
    pub fn with_id(mut self, id: &str) -> DomainResult<Self> {
        self.id = required("id", id)?;
        let owner = self.owner_ref();
        for credential in &mut self.gitlab_credentials {
            credential.rebind(owner.clone());
        }
        Ok(self)
    }

    // ------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Opaque token owned by the identity subsystem.
    pub fn security_stamp(&self) -> &str {
        &self.security_stamp
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        self.last_seen_at
    }

    /// Read-only view of the linked credentials.
    pub fn gitlab_credentials(&self) -> &[GitLabCredential] {
        &self.gitlab_credentials
    }

    // ------------------------------------------------------------
    // profile
    // ------------------------------------------------------------

    /// Replace profile fields. A blank `display_name` falls back to `full_name`.
    pub fn update_profile(
        &mut self,
        full_name: &str,
        display_name: Option<&str>,
        bio: Option<&str>,
    ) -> DomainResult<()> {
        let full_name = required("full_name", full_name)?;
        self.display_name = optional(display_name).unwrap_or_else(|| full_name.clone());
        self.full_name = full_name;
        self.bio = bio.map(str::to_string);
        self.touch_updated();
        Ok(())
    }

    /// Set the avatar URL; blank input clears it. The URL is not validated.
    pub fn set_avatar(&mut self, avatar_url: Option<&str>) {
        self.avatar_url = optional(avatar_url);
        self.touch_updated();
    }

    pub fn clear_avatar(&mut self) {
        self.avatar_url = None;
        self.touch_updated();
    }

    /// Returns whether the state changed.
    pub fn activate(&mut self) -> bool {
        self.set_active(true)
    }

    /// Returns whether the state changed.
    pub fn deactivate(&mut self) -> bool {
        self.set_active(false)
    }

    /// Record activity. Does not count as a profile change.
    pub fn touch_last_seen(&mut self) {
        self.last_seen_at = Some(self.clock.now());
    }

    fn set_active(&mut self, active: bool) -> bool {
        if self.is_active == active {
            return false;
        }
        debug!(user = %self.id, active, "user activation changed");
        self.is_active = active;
        self.touch_updated();
        true
    }

    fn touch_updated(&mut self) {
        self.updated_at = self.clock.now();
    }

    // ------------------------------------------------------------
    // GitLab credentials
    // ------------------------------------------------------------

    /// Link a new credential to this user and return it.
    ///
    /// Fails with `InvalidArgument` on a blank name or token and with
    /// `InvalidOperation` when the name is already taken (ignoring case).
    pub fn add_gitlab_credential(
        &mut self,
        name: &str,
        encrypted_access_token: &str,
        gitlab_username: Option<&str>,
    ) -> DomainResult<&GitLabCredential> {
        let name = required("name", name)?;
        if encrypted_access_token.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "encrypted_access_token",
                "encrypted access token is required",
            ));
        }
        if self.gitlab_credentials.iter().any(|c| c.matches_name(&name)) {
            return Err(DomainError::invalid_operation(format!(
                "a GitLab credential named '{}' already exists for user '{}'",
                name, self.user_name
            )));
        }

        debug!(user = %self.id, credential = %name, "add GitLab credential");
        let credential = GitLabCredential::new(
            name,
            encrypted_access_token.to_string(),
            optional(gitlab_username),
            self.owner_ref(),
        );
        self.gitlab_credentials.push(credential);
        self.touch_updated();

        let index = self.gitlab_credentials.len() - 1;
        Ok(&self.gitlab_credentials[index])
    }

    /// Remove a credential by id. Returns false if there is none.
    pub fn remove_gitlab_credential(&mut self, id: CredentialId) -> bool {
        self.take_gitlab_credential(id).is_some()
    }

    /// Remove a credential by name (ignoring case). Returns false if there is none.
    pub fn remove_gitlab_credential_by_name(&mut self, name: &str) -> bool {
        self.take_gitlab_credential_by_name(name).is_some()
    }

    /// Remove a credential by id and hand it back detached from this user.
    pub fn take_gitlab_credential(&mut self, id: CredentialId) -> Option<GitLabCredential> {
        let index = self.position_by_id(id)?;
        Some(self.detach_at(index))
    }

    /// Remove a credential by name and hand it back detached from this user.
    pub fn take_gitlab_credential_by_name(&mut self, name: &str) -> Option<GitLabCredential> {
        let index = self
            .gitlab_credentials
            .iter()
            .position(|c| c.matches_name(name))?;
        Some(self.detach_at(index))
    }

    pub fn get_gitlab_credential_by_id(&self, id: CredentialId) -> Option<&GitLabCredential> {
        self.gitlab_credentials.iter().find(|c| c.id() == Some(id))
    }

    pub fn get_gitlab_credential_by_name(&self, name: &str) -> Option<&GitLabCredential> {
        self.gitlab_credentials.iter().find(|c| c.matches_name(name))
    }

    /// Replace the encrypted token of an existing credential.
    pub fn update_gitlab_credential_token(
        &mut self,
        id: CredentialId,
        new_encrypted_token: &str,
    ) -> DomainResult<()> {
        if new_encrypted_token.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "new_encrypted_token",
                "encrypted token is required",
            ));
        }
        let index = self.position_by_id(id).ok_or_else(|| {
            DomainError::invalid_operation(format!("GitLab credential {} not found", id))
        })?;

        debug!(user = %self.id, credential = id, "update GitLab credential token");
        self.gitlab_credentials[index].set_encrypted_access_token(new_encrypted_token.to_string());
        self.touch_updated();
        Ok(())
    }

    /// Record the id persistence assigned to a newly stored credential.
    ///
    /// This is bookkeeping, not a profile change, so `updated_at` is kept.
    pub fn assign_gitlab_credential_id(&mut self, name: &str, id: CredentialId) -> DomainResult<()> {
        let name = name.trim();
        if let Some(other) = self.get_gitlab_credential_by_id(id) {
            if !other.matches_name(name) {
                return Err(DomainError::invalid_operation(format!(
                    "GitLab credential id {} is already used by '{}'",
                    id,
                    other.name()
                )));
            }
        }
        let credential = self
            .gitlab_credentials
            .iter_mut()
            .find(|c| c.matches_name(name))
            .ok_or_else(|| {
                DomainError::invalid_operation(format!("GitLab credential '{}' not found", name))
            })?;
        credential.set_id(id);
        Ok(())
    }

    fn position_by_id(&self, id: CredentialId) -> Option<usize> {
        self.gitlab_credentials
            .iter()
            .position(|c| c.id() == Some(id))
    }

    /// Removal and back-reference clearing happen here and nowhere else.
    fn detach_at(&mut self, index: usize) -> GitLabCredential {
        let mut credential = self.gitlab_credentials.remove(index);
        credential.detach();
        debug!(user = %self.id, credential = %credential.name(), "remove GitLab credential");
        self.touch_updated();
        credential
    }

    fn owner_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            user_name: self.user_name.clone(),
        }
    }
}

impl fmt::Display for ApplicationUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}
