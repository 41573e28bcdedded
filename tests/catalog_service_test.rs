//! Tests for CatalogService

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use repocat::application::services::CatalogService;
use repocat::application::{ApplicationError, MissingParentPolicy};
use repocat::domain::ManualClock;
use repocat::infrastructure::traits::{MemoryFileSystem, RealFileSystem};
use repocat::util::testing;

const CATALOG: &str = r#"
[[groups]]
id = "platform"
name = "Platform"
url = "https://gitlab.example.com/platform"

[[groups]]
id = "backend"
name = "Backend"
parent = "platform"

[[groups]]
id = "services"
name = "Services"
parent = "backend"

[[groups]]
id = "tools"
name = "Tools"

[[repositories]]
id = "api"
name = "API"
group = "backend"
url = "https://gitlab.example.com/platform/backend/api"

[[repositories]]
id = "billing"
name = "Billing"
group = "services"
url = "https://gitlab.example.com/platform/backend/services/billing"

[[repositories]]
id = "lint"
name = "Lint"
group = "tools"
url = "https://gitlab.example.com/tools/lint"

[[users]]
id = "u-alice"
user_name = "alice"
email = "alice@example.com"
full_name = "Alice Liddell"
display_name = "Alice"

[[users.credentials]]
id = 1
name = "work"
encrypted_access_token = "enc:aaaa"
gitlab_username = "alice.l"

[[users.credentials]]
name = "personal"
encrypted_access_token = "enc:bbbb"

[[users]]
user_name = "bob"
email = "bob@example.com"
full_name = "Bob"
active = false
"#;

fn service(policy: MissingParentPolicy) -> CatalogService {
    testing::init_test_setup();
    let clock = ManualClock::shared(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    CatalogService::new(Arc::new(RealFileSystem), clock, policy)
}

/// Helper to create a catalog file for testing
fn write_catalog(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("catalog.toml");
    std::fs::write(&path, content).expect("write catalog");
    path
}

#[test]
fn given_catalog_file_when_loading_then_entities_are_built_and_linked() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_catalog(&temp, CATALOG);

    // Act
    let catalog = service(MissingParentPolicy::Error).load(&path).unwrap();

    // Assert - groups
    assert_eq!(catalog.groups.len(), 4);
    assert_eq!(catalog.groups.depth(), 3);
    let services = catalog.groups.get("services").unwrap();
    let backend = services.parent_group().expect("parent rehydrated");
    assert_eq!(backend.id(), "backend");
    assert_eq!(backend.parent_group().unwrap().id(), "platform");
    assert_eq!(catalog.groups.path("services").unwrap(), "Platform / Backend / Services");

    // Assert - repositories
    let billing = catalog.repositories.iter().find(|r| r.id() == "billing").unwrap();
    assert_eq!(billing.group_id(), "services");
    assert!(billing.group().parent_group().is_some());

    // Assert - users
    let alice = catalog.user_by_name("alice").unwrap();
    assert_eq!(alice.id(), "u-alice");
    assert_eq!(alice.display_name(), "Alice");
    assert_eq!(alice.gitlab_credentials().len(), 2);
    let work = alice.get_gitlab_credential_by_id(1).unwrap();
    assert_eq!(work.gitlab_username(), Some("alice.l"));
    assert_eq!(work.application_user_id(), Some("u-alice"));
    assert!(alice.gitlab_credentials()[1].id().is_none());

    let bob = catalog.user_by_name("bob").unwrap();
    assert!(!bob.is_active());
}

#[test]
fn given_group_when_listing_repositories_then_subgroups_are_optional() {
    let temp = TempDir::new().unwrap();
    let path = write_catalog(&temp, CATALOG);
    let catalog = service(MissingParentPolicy::Error).load(&path).unwrap();

    let deep: Vec<_> = catalog
        .repositories_in("platform", true)
        .unwrap()
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(deep, vec!["api", "billing"]);

    assert!(catalog.repositories_in("platform", false).unwrap().is_empty());
    assert!(matches!(
        catalog.repositories_in("nope", true),
        Err(ApplicationError::GroupNotFound(_))
    ));
}

#[test]
fn given_indirect_cycle_when_loading_then_cycle_detected() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_catalog(
        &temp,
        r#"
[[groups]]
id = "a"
name = "A"
parent = "b"

[[groups]]
id = "b"
name = "B"
parent = "a"
"#,
    );

    // Act
    let err = service(MissingParentPolicy::Error).load(&path).unwrap_err();

    // Assert
    match err {
        ApplicationError::CycleDetected(path) => assert_eq!(path, vec!["a", "b", "a"]),
        other => panic!("expected cycle, got {other}"),
    }
}

#[test]
fn given_self_parent_in_snapshot_when_loading_then_domain_error() {
    let fs = MemoryFileSystem::new().with_file(
        "/cat.toml",
        "[[groups]]\nid = \"a\"\nname = \"A\"\nparent = \"a\"\n",
    );
    let clock = ManualClock::shared(Utc::now());
    let service = CatalogService::new(Arc::new(fs), clock, MissingParentPolicy::Error);

    let err = service.load(Path::new("/cat.toml")).unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(e) if e.is_invalid_operation()));
}

#[test]
fn given_unknown_parent_when_policy_is_detach_then_group_becomes_root() {
    let temp = TempDir::new().unwrap();
    let path = write_catalog(&temp, "[[groups]]\nid = \"a\"\nname = \"A\"\nparent = \"ghost\"\n");

    let strict = service(MissingParentPolicy::Error).load(&path);
    assert!(matches!(strict, Err(ApplicationError::UnknownParent { .. })));

    let lenient = service(MissingParentPolicy::Detach).load(&path).unwrap();
    assert!(lenient.groups.get("a").unwrap().is_root());
}

#[test]
fn given_repository_with_unknown_group_when_loading_then_unknown_group() {
    let temp = TempDir::new().unwrap();
    let path = write_catalog(
        &temp,
        "[[repositories]]\nid = \"r\"\nname = \"R\"\ngroup = \"missing\"\nurl = \"https://x\"\n",
    );

    let err = service(MissingParentPolicy::Error).load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownGroup { .. }));
}

#[test]
fn given_duplicate_credential_names_when_loading_then_domain_error() {
    let temp = TempDir::new().unwrap();
    let path = write_catalog(
        &temp,
        r#"
[[users]]
user_name = "carol"
email = "carol@example.com"
full_name = "Carol"

[[users.credentials]]
name = "Work"
encrypted_access_token = "x"

[[users.credentials]]
name = "work"
encrypted_access_token = "y"
"#,
    );

    let err = service(MissingParentPolicy::Error).load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(e) if e.is_invalid_operation()));
}

#[test]
fn given_missing_file_when_loading_then_snapshot_error() {
    let temp = TempDir::new().unwrap();
    let err = service(MissingParentPolicy::Error)
        .load(&temp.path().join("absent.toml"))
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Snapshot { .. }));
}

#[test]
fn given_invalid_toml_when_loading_then_snapshot_error() {
    let temp = TempDir::new().unwrap();
    let path = write_catalog(&temp, "[[groups]\nid = ");
    let err = service(MissingParentPolicy::Error).load(&path).unwrap_err();
    assert!(matches!(err, ApplicationError::Snapshot { .. }));
    assert!(err.to_string().contains("catalog.toml"));
}

#[test]
fn given_directory_as_catalog_when_loading_then_snapshot_error() {
    let temp = TempDir::new().unwrap();
    let err = service(MissingParentPolicy::Error).load(temp.path()).unwrap_err();
    match err {
        ApplicationError::Snapshot { message, .. } => assert_eq!(message, "not a regular file"),
        other => panic!("expected snapshot error, got {other}"),
    }
}

#[test]
fn given_padded_credential_name_with_id_when_loading_then_id_is_assigned() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_catalog(
        &temp,
        r#"
[[users]]
user_name = "erin"
email = "erin@example.com"
full_name = "Erin"

[[users.credentials]]
id = 1
name = " work "
encrypted_access_token = "enc:cccc"
"#,
    );

    // Act
    let catalog = service(MissingParentPolicy::Error).load(&path).unwrap();

    // Assert
    let erin = catalog.user_by_name("erin").unwrap();
    let work = erin.get_gitlab_credential_by_id(1).unwrap();
    assert_eq!(work.name(), "work");
}
