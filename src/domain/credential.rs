//! GitLab credentials linked to an application user.

use std::fmt;

use sha2::{Digest, Sha256};

/// Identifier assigned by persistence after insert.
pub type CredentialId = i64;

/// Navigation handle from a credential back to its owning user.
///
/// Carries identity only; the user owns the credential, not the other way
/// round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
    pub user_name: String,
}

/// An encrypted GitLab access token owned by one [`ApplicationUser`].
///
/// Only the owning user can construct or mutate an attached credential. The
/// owner reference and the owner id are one field, so they are set and
/// cleared together.
///
/// [`ApplicationUser`]: crate::domain::ApplicationUser
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabCredential {
    id: Option<CredentialId>,
    name: String,
    encrypted_access_token: String,
    gitlab_username: Option<String>,
    owner: Option<UserRef>,
}

impl GitLabCredential {
    pub(crate) fn new(
        name: String,
        encrypted_access_token: String,
        gitlab_username: Option<String>,
        owner: UserRef,
    ) -> Self {
        Self {
            id: None,
            name,
            encrypted_access_token,
            gitlab_username,
            owner: Some(owner),
        }
    }

    /// Persistence id, `None` until the credential has been stored.
    pub fn id(&self) -> Option<CredentialId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque, already-encrypted token.
    pub fn encrypted_access_token(&self) -> &str {
        &self.encrypted_access_token
    }

    pub fn gitlab_username(&self) -> Option<&str> {
        self.gitlab_username.as_deref()
    }

    pub fn application_user(&self) -> Option<&UserRef> {
        self.owner.as_ref()
    }

    pub fn application_user_id(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.id.as_str())
    }

    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    /// Short SHA-256 fingerprint of the encrypted token, safe to display.
    pub fn token_fingerprint(&self) -> String {
        let digest = Sha256::digest(self.encrypted_access_token.as_bytes());
        hex::encode(&digest[..4])
    }

    /// Stored names are trimmed, so the probe is trimmed as well.
    pub(crate) fn matches_name(&self, name: &str) -> bool {
        names_equal(&self.name, name.trim())
    }

    pub(crate) fn set_id(&mut self, id: CredentialId) {
        self.id = Some(id);
    }

    pub(crate) fn set_encrypted_access_token(&mut self, token: String) {
        self.encrypted_access_token = token;
    }

    pub(crate) fn rebind(&mut self, owner: UserRef) {
        self.owner = Some(owner);
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
    }
}

impl fmt::Debug for GitLabCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabCredential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("token", &format_args!("sha256:{}", self.token_fingerprint()))
            .field("gitlab_username", &self.gitlab_username)
            .field("application_user_id", &self.application_user_id())
            .finish()
    }
}

/// Case-insensitive name comparison, one character at a time.
///
/// A character whose upper case expands to several characters (`ß` → `SS`)
/// only matches itself, so names of different lengths never compare equal.
pub(crate) fn names_equal(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| fold(x) == fold(y))
}

fn fold(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> UserRef {
        UserRef {
            id: "u1".into(),
            user_name: "alice".into(),
        }
    }

    #[test]
    fn debug_does_not_leak_token() {
        let cred = GitLabCredential::new("work".into(), "s3cr3t-cipher".into(), None, owner());
        let dbg = format!("{:?}", cred);
        assert!(!dbg.contains("s3cr3t-cipher"));
        assert!(dbg.contains(&cred.token_fingerprint()));
        assert_eq!(cred.token_fingerprint().len(), 8);
    }

    #[test]
    fn detach_clears_reference_and_id_together() {
        let mut cred = GitLabCredential::new("work".into(), "t".into(), None, owner());
        assert_eq!(cred.application_user_id(), Some("u1"));
        assert!(cred.is_attached());

        cred.detach();

        assert!(cred.application_user().is_none());
        assert!(cred.application_user_id().is_none());
    }

    #[test]
    fn names_compare_case_insensitively() {
        assert!(names_equal("Work", "wORK"));
        assert!(names_equal("Ärger", "äRGER"));
        assert!(!names_equal("work", "works"));
    }

    #[test]
    fn names_do_not_equate_multi_char_case_expansions() {
        assert!(!names_equal("straße", "STRASSE"));
        assert!(names_equal("straße", "STRAßE"));
    }
}
