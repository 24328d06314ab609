//! Read-only score report for one team.
//!
//! Loads the team's save without creating or modifying anything, so it is
//! safe to run next to a live kiosk.

use raffle_core::{CategoryScore, Engine, SaveStore, SessionType};
use serde::Serialize;
use tracing::debug;

use crate::cli::args::{OutputFormat, SummaryArgs};
use crate::cli::commands::load_roster;
use crate::config::RaffleConfig;
use crate::error::RaffleError;
use crate::storage::FileStore;

/// Scores and ticket totals for one saved team.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    /// Login code the save belongs to
    pub code: String,
    /// Team name, if the code is on the roster
    pub team: Option<String>,
    /// Session the code belongs to; `general` when it is not on the roster
    pub session: SessionType,
    /// Per-category scores
    pub categories: Vec<CategoryScore>,
    /// Questions answered correctly across all categories
    pub correct: usize,
    /// Tickets already handed out
    pub tickets_redeemed: i64,
    /// Tickets earned but not yet handed out
    pub redeemable_tickets: i64,
}

impl SummaryReport {
    /// Builds the report from a decoded save.
    #[must_use]
    pub fn new(engine: &Engine, team: Option<String>, session: SessionType) -> Self {
        Self {
            code: engine.team_code().to_string(),
            team,
            session,
            categories: engine.session_summary(),
            correct: engine.count_correct(),
            tickets_redeemed: engine.tickets_redeemed(),
            redeemable_tickets: engine.redeemable_tickets(),
        }
    }

    fn render_human(&self) -> String {
        let mut text = match &self.team {
            Some(team) => format!("{team} ({}, {} session)\n", self.code, self.session),
            None => format!("Team {} (not on roster)\n", self.code),
        };
        for row in &self.categories {
            text.push_str(&format!("  {:<24} {:>3}/{}\n", row.name, row.correct, row.total));
        }
        text.push_str(&format!("Correct answers:   {}\n", self.correct));
        text.push_str(&format!("Tickets redeemed:  {}\n", self.tickets_redeemed));
        text.push_str(&format!("Tickets to redeem: {}", self.redeemable_tickets));
        text
    }
}

/// Print the saved scores for a team.
///
/// # Errors
///
/// Returns [`RaffleError::NoSave`] if the team has never saved, or a
/// storage error if the save cannot be read.
pub fn run(args: &SummaryArgs, config: &RaffleConfig) -> Result<(), RaffleError> {
    let store = FileStore::new(&config.save_dir);
    let Some(text) = store.read(&args.code)? else {
        return Err(RaffleError::NoSave(args.code.clone()));
    };
    debug!(code = %args.code, bytes = text.len(), "save loaded for summary");

    let engine = Engine::decode(&text);
    let directory = load_roster(config);
    let team = directory.lookup(&args.code).map(|team| team.name);
    let report = SummaryReport::new(&engine, team, directory.session_for(&args.code));

    match args.format {
        OutputFormat::Human => println!("{}", report.render_human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
