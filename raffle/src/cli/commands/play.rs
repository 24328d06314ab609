//! Interactive kiosk on stdin/stdout.
//!
//! Each input line is one command. Ctrl-C and SIGTERM save the active
//! session before the process exits.

use std::io::{self, Write};

use rand::SeedableRng;
use rand::rngs::StdRng;
use raffle_core::{BankSource, Kiosk, KioskError, SaveStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::args::PlayArgs;
use crate::cli::commands::{load_roster, missing_banks};
use crate::config::RaffleConfig;
use crate::error::{ExitCode, RaffleError};
use crate::storage::{FileBanks, FileStore};

const HELP: &str = "\
Commands:
  login <pin>      start a session
  1-4              answer with the numbered choice
  skip             show a different question
  score            show scores and tickets to redeem
  redeem <admin>   hand out earned tickets
  logout           save and end the session
  quit             save and leave the kiosk";

/// Whether the kiosk keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the kiosk.
    Quit,
}

/// Run the interactive kiosk.
///
/// # Errors
///
/// Returns an I/O error if the terminal cannot be read or written,
/// [`RaffleError::Interrupted`] after a signal, or a storage error if the
/// final save fails.
pub async fn run(args: &PlayArgs, config: RaffleConfig) -> Result<(), RaffleError> {
    let directory = load_roster(&config);
    let missing = missing_banks(&config.banks);
    let saves = FileStore::new(&config.save_dir);
    info!(
        save_dir = %saves.dir().display(),
        teams = directory.len(),
        missing_banks = missing.len(),
        "kiosk ready"
    );
    let banks = FileBanks::new(config.banks);
    let mut kiosk = Kiosk::new(directory, saves, banks, config.admin_codes);
    if let Some(seed) = args.seed {
        kiosk = kiosk.with_rng(StdRng::seed_from_u64(seed));
    }

    let mut out = io::stdout();
    writeln!(out, "Raffle trivia. Type 'login <pin>' to start or 'help' for commands.")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("input closed");
                    break;
                };
                if handle_line(&mut kiosk, &line, &mut out)? == Flow::Quit {
                    break;
                }
            }
            code = &mut shutdown => {
                info!(code, "signal received, saving session");
                if kiosk.is_logged_in() {
                    if let Err(err) = kiosk.log_out() {
                        warn!(%err, "session not saved on shutdown");
                    }
                }
                return Err(RaffleError::Interrupted { code });
            }
        }
    }

    if kiosk.is_logged_in() {
        kiosk.log_out()?;
    }
    Ok(())
}

async fn shutdown_signal() -> i32 {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!(%err, "SIGTERM handler unavailable");
            let _ = tokio::signal::ctrl_c().await;
            return ExitCode::INTERRUPTED;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
        _ = sigterm.recv() => ExitCode::TERMINATED,
    }
}

/// Executes one line of kiosk input, writing the response to `out`.
///
/// Kiosk errors are shown to the user and do not end the session.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub fn handle_line<S, B>(
    kiosk: &mut Kiosk<S, B>,
    line: &str,
    out: &mut impl Write,
) -> io::Result<Flow>
where
    S: SaveStore,
    B: BankSource,
{
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };
    let argument = words.next();

    let mut flow = Flow::Continue;
    let result = match (command, argument) {
        ("login", Some(code)) => log_in(kiosk, code, out),
        ("skip", None) => skip(kiosk, out),
        ("score", None) => score(kiosk, out),
        ("redeem", Some(admin_code)) => redeem(kiosk, admin_code, out),
        ("logout", None) => log_out(kiosk, out),
        ("quit" | "exit", None) => {
            flow = Flow::Quit;
            if kiosk.is_logged_in() {
                log_out(kiosk, out)
            } else {
                Ok(())
            }
        }
        ("help", None) => writeln!(out, "{HELP}").map_err(CommandError::Io),
        (choice, None) if choice.parse::<usize>().is_ok() => answer(kiosk, choice, out),
        _ => writeln!(out, "Unknown command '{}'. Type 'help' for commands.", line.trim())
            .map_err(CommandError::Io),
    };

    match result {
        Ok(()) => {}
        Err(CommandError::Kiosk(err)) => writeln!(out, "error: {err}")?,
        Err(CommandError::Io(err)) => return Err(err),
    }
    Ok(flow)
}

enum CommandError {
    Kiosk(KioskError),
    Io(io::Error),
}

impl From<KioskError> for CommandError {
    fn from(err: KioskError) -> Self {
        Self::Kiosk(err)
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

type CommandResult = Result<(), CommandError>;

fn log_in<S: SaveStore, B: BankSource>(
    kiosk: &mut Kiosk<S, B>,
    code: &str,
    out: &mut impl Write,
) -> CommandResult {
    let team = kiosk.log_in(code)?;
    writeln!(out, "Welcome, {} ({} session)!", team.name, team.session)?;
    show_question(kiosk, out)
}

fn answer<S: SaveStore, B: BankSource>(
    kiosk: &mut Kiosk<S, B>,
    choice: &str,
    out: &mut impl Write,
) -> CommandResult {
    let chosen = kiosk.current_choices().and_then(|choices| {
        choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| choices.get(i))
            .cloned()
    });

    let Some(chosen) = chosen else {
        if !kiosk.is_logged_in() {
            return Err(KioskError::NotLoggedIn.into());
        }
        if kiosk.current_question().is_none() {
            return Err(KioskError::NoQuestion.into());
        }
        writeln!(out, "Pick a choice from 1 to 4.")?;
        return Ok(());
    };

    let outcome = kiosk.submit_answer(&chosen)?;
    if outcome.correct {
        writeln!(out, "Correct!")?;
    } else {
        writeln!(out, "Not quite. The answer was: {}", outcome.correct_answer)?;
    }
    for name in &outcome.unlocked {
        writeln!(out, "Unlocked category: {name}")?;
    }
    if let Some(err) = outcome.save_error {
        writeln!(out, "warning: progress not saved: {err}")?;
    }
    show_question(kiosk, out)
}

fn skip<S: SaveStore, B: BankSource>(kiosk: &mut Kiosk<S, B>, out: &mut impl Write) -> CommandResult {
    kiosk.skip()?;
    show_question(kiosk, out)
}

fn score<S: SaveStore, B: BankSource>(kiosk: &Kiosk<S, B>, out: &mut impl Write) -> CommandResult {
    for row in kiosk.session_summary()? {
        writeln!(out, "{:<24} {:>3}/{}", row.name, row.correct, row.total)?;
    }
    writeln!(out, "Tickets to redeem: {}", kiosk.redeemable_tickets()?)?;
    Ok(())
}

fn redeem<S: SaveStore, B: BankSource>(
    kiosk: &mut Kiosk<S, B>,
    admin_code: &str,
    out: &mut impl Write,
) -> CommandResult {
    let redemption = kiosk.redeem(admin_code)?;
    writeln!(out, "Redeemed {} ticket(s).", redemption.tickets)?;
    if let Some(err) = redemption.save_error {
        writeln!(out, "warning: redemption not saved: {err}")?;
    }
    Ok(())
}

fn log_out<S: SaveStore, B: BankSource>(kiosk: &mut Kiosk<S, B>, out: &mut impl Write) -> CommandResult {
    let name = kiosk.team().map(|t| t.name.clone());
    kiosk.log_out()?;
    if let Some(name) = name {
        writeln!(out, "Goodbye, {name}. Progress saved.")?;
    }
    Ok(())
}

fn show_question<S: SaveStore, B: BankSource>(kiosk: &Kiosk<S, B>, out: &mut impl Write) -> CommandResult {
    let (Some(question), Some(choices)) = (kiosk.current_question(), kiosk.current_choices()) else {
        writeln!(out, "All questions answered. Thanks for playing!")?;
        return Ok(());
    };

    writeln!(out)?;
    writeln!(
        out,
        "[{}] {}",
        kiosk.current_category().unwrap_or_default(),
        question.prompt()
    )?;
    for (number, choice) in (1..).zip(choices) {
        writeln!(out, "  {number}) {choice}")?;
    }
    Ok(())
}
