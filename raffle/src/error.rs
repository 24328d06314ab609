//! Error types for the `raffle` kiosk
//!
//! Aggregates the engine's errors with configuration and I/O failures and
//! maps each onto a process exit code.

use std::path::PathBuf;

use raffle_core::{KioskError, StorageError};
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `raffle` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error (including files that failed validation)
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Save or question bank could not be read or written
    pub const STORAGE_ERROR: i32 = 4;

    /// Session error (unknown login code, no active team)
    pub const SESSION_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `raffle` operations.
#[derive(Debug, Error)]
pub enum RaffleError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Save store or bank source failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Kiosk session error
    #[error(transparent)]
    Kiosk(#[from] KioskError),

    /// No save exists for a login code
    #[error("no save found for team {0}")]
    NoSave(String),

    /// One or more files failed validation
    #[error("{failed} of {checked} file(s) failed validation")]
    Invalid {
        /// Files with at least one problem
        failed: usize,
        /// Files checked
        checked: usize,
    },

    /// Session ended by a signal after saving
    #[error("interrupted")]
    Interrupted {
        /// Exit code for the signal received
        code: i32,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RaffleError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Storage(_) | Self::NoSave(_) | Self::Kiosk(KioskError::Storage(_)) => {
                ExitCode::STORAGE_ERROR
            }
            Self::Kiosk(_) => ExitCode::SESSION_ERROR,
            Self::Invalid { .. } | Self::Json(_) => ExitCode::ERROR,
            Self::Interrupted { code } => *code,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration file not found or unreadable
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced in {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// File the reference appeared in
        location: String,
    },
}

// ============================================================================
// Tests
// ============================================================================
