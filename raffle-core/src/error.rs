//! Core error types for the raffle trivia engine
//!
//! Nothing in the engine is fatal: malformed rows are skipped and reported,
//! lookups miss with `None`, and storage failures are handed back to the
//! caller while the in-memory session carries on.

use thiserror::Error;

// ============================================================================
// Row Errors
// ============================================================================

/// A line of bank, save, or roster text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// Wrong number of tab-delimited fields
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Human-readable description of the accepted field counts
        expected: &'static str,
        /// Number of fields actually present
        found: usize,
    },

    /// A question row whose category field names a different category
    #[error("row belongs to category '{found}', not '{expected}'")]
    WrongCategory {
        /// Category the row was offered to
        expected: String,
        /// Category named by the row
        found: String,
    },

    /// `TEAM:` or `CATEGORY:` header that is missing a component
    #[error("malformed {kind} header")]
    Header {
        /// Header keyword (`TEAM` or `CATEGORY`)
        kind: &'static str,
    },

    /// Question row with an empty prompt, answer, or distractor
    #[error("question row has an empty {field} field")]
    EmptyField {
        /// Name of the empty field
        field: &'static str,
    },

    /// Redeemed ticket count that is not an integer
    #[error("invalid ticket count '{0}'")]
    TicketCount(String),
}

// ============================================================================
// Storage Errors
// ============================================================================

/// Failure reported by a save store or bank source.
///
/// Absence of a save is not an error; stores report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a team's save failed for a reason other than absence
    #[error("failed to read save for team {key}: {source}")]
    Read {
        /// Team login code the save is keyed by
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing a team's save failed
    #[error("failed to write save for team {key}: {source}")]
    Write {
        /// Team login code the save is keyed by
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A reference question bank could not be read
    #[error("question bank '{bank}' unavailable: {reason}")]
    Bank {
        /// Bank name (session type)
        bank: String,
        /// Why it could not be read
        reason: String,
    },
}

// ============================================================================
// Kiosk Errors
// ============================================================================

/// Errors returned by the kiosk session controller.
#[derive(Debug, Error)]
pub enum KioskError {
    /// Login code is not on the roster
    #[error("pin {0} is not valid")]
    UnknownTeam(String),

    /// Operation requires an active session
    #[error("no team is logged in at this time")]
    NotLoggedIn,

    /// There is no question on screen to answer
    #[error("no question is available")]
    NoQuestion,

    /// Redemption attempted with a code that is not an admin code
    #[error("invalid admin login")]
    InvalidAdminCode,

    /// Storage collaborator failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}
