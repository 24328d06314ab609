//! Storage collaborators the engine reads from and writes to.
//!
//! The engine never touches files directly. Saves are keyed by login code;
//! reference banks are selected by [`SessionType`]. The in-memory
//! implementations here back the unit tests and embedders that keep saves
//! elsewhere.

use std::collections::HashMap;

use crate::error::StorageError;
use crate::team::SessionType;

/// Keyed store for team saves.
pub trait SaveStore {
    /// Reads the save for `code`.
    ///
    /// Returns `Ok(None)` when no save exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if a save exists but cannot be read.
    fn read(&self, code: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the save for `code` with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the save cannot be written.
    fn write(&mut self, code: &str, text: &str) -> Result<(), StorageError>;
}

/// Source of reference question banks.
pub trait BankSource {
    /// Reads the bank text for a session type.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Bank`] if the bank cannot be read.
    fn read(&self, session: SessionType) -> Result<String, StorageError>;
}

impl<T: SaveStore + ?Sized> SaveStore for Box<T> {
    fn read(&self, code: &str) -> Result<Option<String>, StorageError> {
        (**self).read(code)
    }

    fn write(&mut self, code: &str, text: &str) -> Result<(), StorageError> {
        (**self).write(code, text)
    }
}

impl<T: BankSource + ?Sized> BankSource for Box<T> {
    fn read(&self, session: SessionType) -> Result<String, StorageError> {
        (**self).read(session)
    }
}

/// Save store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saves: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored save for `code`, if any.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.saves.get(code).map(String::as_str)
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, code: &str) -> Result<Option<String>, StorageError> {
        Ok(self.saves.get(code).cloned())
    }

    fn write(&mut self, code: &str, text: &str) -> Result<(), StorageError> {
        self.saves.insert(code.to_string(), text.to_string());
        Ok(())
    }
}

/// Question banks held in memory.
///
/// A session type with no bank reads as empty text.
#[derive(Debug, Clone, Default)]
pub struct MemoryBanks {
    banks: HashMap<SessionType, String>,
}

impl MemoryBanks {
    /// Creates a source with no banks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bank text for a session type.
    #[must_use]
    pub fn with_bank(mut self, session: SessionType, text: impl Into<String>) -> Self {
        self.banks.insert(session, text.into());
        self
    }
}

impl BankSource for MemoryBanks {
    fn read(&self, session: SessionType) -> Result<String, StorageError> {
        Ok(self.banks.get(&session).cloned().unwrap_or_default())
    }
}
