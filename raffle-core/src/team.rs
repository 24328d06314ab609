//! Team roster: maps login codes to teams and their session.
//!
//! The roster is a tab-delimited text file with one team per line:
//! `name\tmorning_code\tafternoon_code`.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RowError;
use crate::format::split_fields;

/// Which competition session a team plays in.
///
/// Each session draws its questions from its own reference bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Morning session teams.
    Morning,
    /// Afternoon session teams.
    Afternoon,
    /// Codes not on the roster; uses the general bank.
    General,
}

impl SessionType {
    /// Every session type, in roster column order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::General];

    /// Lower-case name used in logs and bank configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::General => "general",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team found on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    /// Display name
    pub name: String,
    /// Session the login code belongs to
    pub session: SessionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RosterEntry {
    name: String,
    morning_code: String,
    afternoon_code: String,
}

/// Lookup from login code to team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamDirectory {
    entries: Vec<RosterEntry>,
}

impl TeamDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses roster text, skipping (and logging) malformed lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut directory = Self::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if let Err(err) = directory.add_line(line) {
                warn!(line = index + 1, %err, "skipping malformed roster line");
            }
        }
        debug!(teams = directory.len(), "roster loaded");
        directory
    }

    /// Adds one roster line.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::FieldCount`] if the line has fewer than three fields.
    pub fn add_line(&mut self, line: &str) -> Result<(), RowError> {
        let fields = split_fields(line);
        if fields.len() < 3 {
            return Err(RowError::FieldCount {
                expected: "3",
                found: fields.len(),
            });
        }
        self.add_team(fields[0], fields[1], fields[2]);
        Ok(())
    }

    /// Adds a team with its morning and afternoon login codes.
    ///
    /// An empty code means the team does not play in that session.
    pub fn add_team(&mut self, name: &str, morning_code: &str, afternoon_code: &str) {
        self.entries.push(RosterEntry {
            name: name.to_string(),
            morning_code: morning_code.trim().to_string(),
            afternoon_code: afternoon_code.trim().to_string(),
        });
    }

    /// Finds the team for a login code.
    ///
    /// Morning codes are searched before afternoon codes. Empty codes never
    /// match.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<Team> {
        if code.is_empty() {
            return None;
        }

        let found = self
            .entries
            .iter()
            .find(|e| e.morning_code == code)
            .map(|e| (e, SessionType::Morning))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.afternoon_code == code)
                    .map(|e| (e, SessionType::Afternoon))
            });

        match found {
            Some((entry, session)) => {
                debug!(team = %entry.name, %session, "login code found");
                Some(Team {
                    name: entry.name.clone(),
                    session,
                })
            }
            None => {
                debug!("login code not on roster");
                None
            }
        }
    }

    /// Session type for a code, falling back to [`SessionType::General`].
    #[must_use]
    pub fn session_for(&self, code: &str) -> SessionType {
        self.lookup(code)
            .map_or(SessionType::General, |team| team.session)
    }

    /// Number of teams on the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the roster has no teams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
