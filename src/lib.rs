//! Repository catalog core.
//!
//! Hierarchical repository groups, repositories that belong to them,
//! application users, and the GitLab credentials each user links.
//!
//! - [`domain`]: entities and their invariants (no I/O)
//! - [`application`]: catalog loading and group hierarchy resolution
//! - [`infrastructure`]: I/O boundary traits and service wiring
//! - [`config`]: layered settings
//! - [`cli`]: the `repocat` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
