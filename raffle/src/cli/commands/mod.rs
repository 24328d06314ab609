//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod play;
pub mod summary;
pub mod validate;
pub mod version;

use std::path::Path;

use raffle_core::{SessionType, TeamDirectory};
use tracing::{info, warn};

use crate::cli::args::{Cli, Commands, StorageArgs};
use crate::config::{self, BankPaths, RaffleConfig};
use crate::error::RaffleError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), RaffleError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Play(args) => {
            let config = resolve_config(config_path, &args.storage)?;
            play::run(&args, config).await
        }
        Commands::Summary(args) => {
            let config = resolve_config(config_path, &args.storage)?;
            summary::run(&args, &config)
        }
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the configuration file (or defaults) and applies CLI overrides.
///
/// # Errors
///
/// Returns [`RaffleError::Config`] if the file cannot be loaded.
pub fn resolve_config(
    path: Option<&Path>,
    storage: &StorageArgs,
) -> Result<RaffleConfig, RaffleError> {
    let mut config = config::load_or_default(path)?;

    if let Some(save_dir) = &storage.save_dir {
        config.save_dir.clone_from(save_dir);
    }
    if let Some(roster) = &storage.roster {
        config.roster.clone_from(roster);
    }

    Ok(config)
}

/// Reads the roster named in the configuration.
///
/// A missing roster is not fatal: the kiosk starts with nobody able to log
/// in, and the problem is logged.
pub fn load_roster(config: &RaffleConfig) -> TeamDirectory {
    match std::fs::read_to_string(&config.roster) {
        Ok(text) => {
            let directory = TeamDirectory::parse(&text);
            info!(path = %config.roster.display(), teams = directory.len(), "roster loaded");
            directory
        }
        Err(err) => {
            warn!(path = %config.roster.display(), %err, "roster unavailable");
            TeamDirectory::new()
        }
    }
}

/// Session types whose question bank file does not exist.
///
/// Teams in those sessions start with only the Starter category, so each
/// one is logged.
pub fn missing_banks(banks: &BankPaths) -> Vec<SessionType> {
    SessionType::ALL
        .into_iter()
        .filter(|&session| {
            let path = banks.path(session);
            let missing = !path.is_file();
            if missing {
                warn!(%session, path = %path.display(), "question bank not found");
            }
            missing
        })
        .collect()
}
