//! Tests for service wiring with injected dependencies

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use repocat::application::MissingParentPolicy;
use repocat::config::Settings;
use repocat::domain::ManualClock;
use repocat::infrastructure::di::ServiceContainer;
use repocat::infrastructure::traits::MemoryFileSystem;
use repocat::util::testing;

const CATALOG: &str = r#"
[[groups]]
id = "g"
name = "G"
parent = "gone"

[[users]]
user_name = "dave"
email = "dave@example.com"
full_name = "Dave"
"#;

#[test]
fn given_container_with_memory_fs_when_loading_then_settings_and_clock_are_used() {
    // Arrange
    testing::init_test_setup();
    let now = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
    let settings = Settings {
        catalog_path: PathBuf::from("/data/catalog.toml"),
        missing_parent: MissingParentPolicy::Detach,
    };
    let fs = MemoryFileSystem::new().with_file("/data/catalog.toml", CATALOG);
    let container = ServiceContainer::with_deps(settings, Arc::new(fs), ManualClock::shared(now));

    // Act
    let catalog = container
        .catalog_service()
        .load(&container.settings.catalog_path)
        .unwrap();

    // Assert
    assert!(catalog.groups.get("g").unwrap().is_root());
    let dave = catalog.user_by_name("dave").unwrap();
    assert_eq!(dave.created_at(), now);
    assert_eq!(dave.updated_at(), now);
}
