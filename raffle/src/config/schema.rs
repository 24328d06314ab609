//! Configuration schema types
//!
//! Deserialized from the YAML file named by `--config`. Every field has a
//! default, so an empty mapping is a valid file.

use std::path::{Path, PathBuf};

use raffle_core::SessionType;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Admin codes accepted for ticket redemption when none are configured.
pub const DEFAULT_ADMIN_CODES: [&str; 4] = ["123456", "654321", "00000", "2020"];

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for a kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaffleConfig {
    /// Roster file mapping login codes to teams
    pub roster: PathBuf,

    /// Directory holding one `save<code>.tsv` per team
    pub save_dir: PathBuf,

    /// Reference question banks per session type
    pub banks: BankPaths,

    /// Codes that authorise ticket redemption
    pub admin_codes: Vec<String>,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            roster: PathBuf::from("pins.tsv"),
            save_dir: PathBuf::from("saves"),
            banks: BankPaths::default(),
            admin_codes: DEFAULT_ADMIN_CODES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl RaffleConfig {
    /// Resolves relative paths against `base`.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.roster);
        join(&mut self.save_dir);
        join(&mut self.banks.morning);
        join(&mut self.banks.afternoon);
        join(&mut self.banks.general);
        self
    }

    /// Checks the values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty admin code list,
    /// an empty admin code, or an empty save directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_codes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "admin_codes".to_string(),
                value: "[]".to_string(),
                expected: "at least one admin code".to_string(),
            });
        }

        if let Some(index) = self.admin_codes.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("admin_codes[{index}]"),
                value: self.admin_codes[index].clone(),
                expected: "a non-empty code".to_string(),
            });
        }

        if self.save_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "save_dir".to_string(),
                value: String::new(),
                expected: "a directory path".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Question Banks
// ============================================================================

/// One bank file per session type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BankPaths {
    /// Bank for morning teams
    pub morning: PathBuf,
    /// Bank for afternoon teams
    pub afternoon: PathBuf,
    /// Bank for codes not on the roster
    pub general: PathBuf,
}

impl Default for BankPaths {
    fn default() -> Self {
        Self {
            morning: PathBuf::from("questions_morning.tsv"),
            afternoon: PathBuf::from("questions_afternoon.tsv"),
            general: PathBuf::from("questions.tsv"),
        }
    }
}

impl BankPaths {
    /// The bank file for a session type.
    #[must_use]
    pub fn path(&self, session: SessionType) -> &Path {
        match session {
            SessionType::Morning => &self.morning,
            SessionType::Afternoon => &self.afternoon,
            SessionType::General => &self.general,
        }
    }
}
