//! Application layer: catalog loading and hierarchy resolution
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod hierarchy;
pub mod services;
pub mod snapshot;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, TomlResultExt};
pub use hierarchy::{GroupHierarchy, GroupNode, MissingParentPolicy};
pub use snapshot::CatalogSnapshot;
