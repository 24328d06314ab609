//! CLI argument definitions
//!
//! All Clap derive structs for `raffle` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Trivia kiosk where teams earn raffle tickets.
#[derive(Parser, Debug)]
#[command(name = "raffle", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to YAML configuration file.
    #[arg(short, long, global = true, env = "RAFFLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "RAFFLE_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "RAFFLE_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive kiosk on the terminal.
    Play(PlayArgs),

    /// Show a team's saved scores and redeemable tickets.
    Summary(SummaryArgs),

    /// Check question banks, saves, or rosters for malformed rows.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Overrides for the storage locations in the configuration file.
#[derive(Args, Debug, Default)]
pub struct StorageArgs {
    /// Directory holding team saves.
    #[arg(long, env = "RAFFLE_SAVE_DIR")]
    pub save_dir: Option<PathBuf>,

    /// Roster file mapping login codes to teams.
    #[arg(long, env = "RAFFLE_ROSTER")]
    pub roster: Option<PathBuf>,
}

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Storage overrides.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Seed the random source for a reproducible session.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Team login code.
    pub code: String,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Storage overrides.
    #[command(flatten)]
    pub storage: StorageArgs,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// What kind of file these are.
    #[arg(short, long, default_value = "bank")]
    pub kind: FileKind,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Kind of data file to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FileKind {
    /// Reference question bank.
    #[default]
    Bank,
    /// Team save file.
    Save,
    /// Team roster.
    Roster,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_parses() {
        let cli = Cli::try_parse_from(["raffle", "play"]);
        assert!(cli.is_ok(), "Failed to parse: {cli:?}");
    }

    #[test]
    fn test_play_storage_overrides() {
        let cli = Cli::try_parse_from([
            "raffle",
            "play",
            "--save-dir",
            "/tmp/saves",
            "--roster",
            "pins.tsv",
            "--seed",
            "7",
        ])
        .unwrap();

        let Commands::Play(args) = cli.command else {
            panic!("Expected PlayArgs");
        };
        assert_eq!(args.storage.save_dir, Some(PathBuf::from("/tmp/saves")));
        assert_eq!(args.storage.roster, Some(PathBuf::from("pins.tsv")));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_summary_requires_code() {
        assert!(Cli::try_parse_from(["raffle", "summary"]).is_err());

        let cli = Cli::try_parse_from(["raffle", "summary", "4821", "--format", "json"]).unwrap();
        let Commands::Summary(args) = cli.command else {
            panic!("Expected SummaryArgs");
        };
        assert_eq!(args.code, "4821");
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validate_requires_files() {
        let result = Cli::try_parse_from(["raffle", "validate"]);
        assert!(result.is_err(), "Expected error for missing files");
    }

    #[test]
    fn test_validate_kinds_parse() {
        for kind in ["bank", "save", "roster"] {
            let cli = Cli::try_parse_from(["raffle", "validate", "f.tsv", "--kind", kind]);
            assert!(cli.is_ok(), "Failed to parse kind={kind}");
        }
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["raffle", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["raffle", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "raffle",
            "-vvv",
            "--color",
            "never",
            "--log-format",
            "json",
            "--config",
            "raffle.yaml",
            "play",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("raffle.yaml")));
    }

    #[test]
    fn test_quiet_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["raffle", "play", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_completions_shells_parse() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            let cli = Cli::try_parse_from(["raffle", "completions", shell]);
            assert!(cli.is_ok(), "Failed to parse shell={shell}");
        }
    }
}
