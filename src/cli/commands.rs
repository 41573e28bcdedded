//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::Catalog;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::{output, tree};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            completion(*shell);
            Ok(())
        }
        Some(Commands::Config { command }) => config_command(cli, command),
        Some(Commands::Tree { group }) => tree_command(&load_catalog(cli)?, group.as_deref()),
        Some(Commands::Check) => check_command(&load_catalog(cli)?),
        Some(Commands::Repos { group, direct }) => {
            repos_command(&load_catalog(cli)?, group.as_deref(), *direct)
        }
        Some(Commands::Users { all }) => users_command(&load_catalog(cli)?, *all),
        None => Err(CliError::Usage(
            "no command given (see `repocat --help`)".into(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("resolve working directory", e))?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(catalog) = &cli.catalog {
        settings.catalog_path = catalog.clone();
    }
    Ok(settings)
}

fn load_catalog(cli: &Cli) -> CliResult<Catalog> {
    let settings = load_settings(cli)?;
    debug!(catalog = %settings.catalog_path.display(), "loading catalog");
    let container = ServiceContainer::new(settings);
    let catalog = container
        .catalog_service()
        .load(&container.settings.catalog_path)?;
    Ok(catalog)
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(cli))]
fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available on this platform"),
        },
    }
    Ok(())
}

#[instrument(skip(catalog))]
fn tree_command(catalog: &Catalog, group: Option<&str>) -> CliResult<()> {
    let trees = tree::forest(catalog, group)?;
    if trees.is_empty() {
        output::warning("catalog has no groups");
    }
    for t in trees {
        output::info(&t);
    }
    Ok(())
}

#[instrument(skip(catalog))]
fn check_command(catalog: &Catalog) -> CliResult<()> {
    let credentials: usize = catalog
        .users
        .iter()
        .map(|u| u.gitlab_credentials().len())
        .sum();
    let inactive = catalog.users.iter().filter(|u| !u.is_active()).count();

    output::success("catalog is valid");
    output::detail(&format!(
        "{} groups ({} roots, depth {})",
        catalog.groups.len(),
        catalog.groups.root_indices().len(),
        catalog.groups.depth()
    ));
    output::detail(&format!("{} repositories", catalog.repositories.len()));
    output::detail(&format!(
        "{} users ({} inactive), {} GitLab credentials",
        catalog.users.len(),
        inactive,
        credentials
    ));
    Ok(())
}

#[instrument(skip(catalog))]
fn repos_command(catalog: &Catalog, group: Option<&str>, direct: bool) -> CliResult<()> {
    let repositories = match group {
        Some(id) => catalog.repositories_in(id, !direct)?,
        None => catalog.repositories.iter().collect(),
    };

    let rows = repositories
        .into_iter()
        .map(|r| {
            let path = catalog
                .groups
                .path(r.group_id())
                .unwrap_or_else(|| r.group_id().to_string());
            (path, r)
        })
        .sorted_by(|(pa, ra), (pb, rb)| pa.cmp(pb).then_with(|| ra.name().cmp(rb.name())));

    for (path, group_rows) in &rows.chunk_by(|(path, _)| path.clone()) {
        output::header(&path);
        for (_, repo) in group_rows {
            output::detail(&format!("{}  {}  {}", repo.id(), repo.name(), repo.url()));
        }
    }
    Ok(())
}

#[instrument(skip(catalog))]
fn users_command(catalog: &Catalog, all: bool) -> CliResult<()> {
    for user in catalog.users.iter().filter(|u| all || u.is_active()) {
        let status = if user.is_active() { "" } else { " [inactive]" };
        output::header(&format!("{}{}", user, status));
        output::detail(&format!("{} <{}>", user.user_name(), user.email()));
        if user.gitlab_credentials().is_empty() {
            output::muted("no GitLab credentials");
        }
        for credential in user.gitlab_credentials() {
            let id = credential
                .id()
                .map(|id| format!("#{}", id))
                .unwrap_or_else(|| "unsaved".into());
            let login = credential
                .gitlab_username()
                .map(|u| format!(" as {}", u))
                .unwrap_or_default();
            output::detail(&format!(
                "{} {}{} sha256:{}",
                id,
                credential.name(),
                login,
                credential.token_fingerprint()
            ));
        }
    }
    Ok(())
}
