//! On-disk catalog snapshot (TOML).
//!
//! ```toml
//! [[groups]]
//! id = "platform"
//! name = "Platform"
//! url = "https://gitlab.example.com/platform"
//!
//! [[groups]]
//! id = "backend"
//! name = "Backend"
//! parent = "platform"
//!
//! [[repositories]]
//! id = "api"
//! name = "API"
//! group = "backend"
//! url = "https://gitlab.example.com/platform/backend/api"
//!
//! [[users]]
//! id = "5f0c..."
//! user_name = "alice"
//! email = "alice@example.com"
//! full_name = "Alice Liddell"
//!
//! [[users.credentials]]
//! id = 1
//! name = "work"
//! encrypted_access_token = "b64:..."
//! ```
//!
//! Records are plain data. Entities are only ever built from them through
//! the domain factories, so every invariant is re-checked on load.

use serde::{Deserialize, Serialize};

use crate::domain::CredentialId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub groups: Vec<GroupRecord>,
    pub repositories: Vec<RepositoryRecord>,
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: String,
    pub name: String,
    pub group: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identity-subsystem id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_name: String,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CredentialId>,
    pub name: String,
    pub encrypted_access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_username: Option<String>,
}

fn default_active() -> bool {
    true
}

impl CatalogSnapshot {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
