//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Repository catalog: hierarchical groups, repositories, users and GitLab credentials
#[derive(Parser, Debug)]
#[command(name = "repocat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Catalog snapshot (default: from settings)
    #[arg(short, long, global = true, env = "REPOCAT_CATALOG", value_hint = ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the group hierarchy with its repositories
    Tree {
        /// Start at this group instead of the roots
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Load and validate the catalog
    Check,

    /// List repositories
    Repos {
        /// Only repositories in this group (and its subgroups)
        #[arg(short, long)]
        group: Option<String>,
        /// With --group: skip subgroups
        #[arg(long, requires = "group")]
        direct: bool,
    },

    /// List users and their linked GitLab credentials
    Users {
        /// Include deactivated users
        #[arg(short, long)]
        all: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings
    Show,
    /// Print the global config file path
    Path,
}
