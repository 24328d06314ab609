//! Filesystem-backed save store and question banks.
//!
//! Each team's save lives in `<save_dir>/save<code>.tsv`. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! save, so a crash mid-write leaves the previous save intact.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use raffle_core::{BankSource, SaveStore, SessionType, StorageError};
use tracing::debug;

use crate::config::BankPaths;

const SAVE_PREFIX: &str = "save";
const SAVE_EXTENSION: &str = "tsv";

/// Save store writing one file per team.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the saves.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the save file for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] for codes that are not plain
    /// alphanumeric tokens, so a code can never name a path outside the
    /// save directory.
    pub fn path_for(&self, code: &str) -> io::Result<PathBuf> {
        let plain = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("login code '{code}' cannot name a save file"),
            ));
        }
        Ok(self
            .dir
            .join(format!("{SAVE_PREFIX}{code}.{SAVE_EXTENSION}")))
    }

    fn write_atomic(&self, path: &Path, text: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let suffix: u16 = rand::random();
        let tmp = self
            .dir
            .join(format!(".{}.{}-{suffix:04x}.tmp", file_name(path), std::process::id()));

        let result = File::create(&tmp).and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            file.sync_all()
        });
        if let Err(err) = result.and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl SaveStore for FileStore {
    fn read(&self, code: &str) -> Result<Option<String>, StorageError> {
        let read_error = |source| StorageError::Read {
            key: code.to_string(),
            source,
        };
        let path = self.path_for(code).map_err(read_error)?;

        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "save read");
                Ok(Some(text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(read_error(err)),
        }
    }

    fn write(&mut self, code: &str, text: &str) -> Result<(), StorageError> {
        let write_error = |source| StorageError::Write {
            key: code.to_string(),
            source,
        };
        let path = self.path_for(code).map_err(write_error)?;
        self.write_atomic(&path, text).map_err(write_error)?;
        debug!(path = %path.display(), bytes = text.len(), "save written");
        Ok(())
    }
}

/// Question banks read from the configured files.
#[derive(Debug, Clone)]
pub struct FileBanks {
    paths: BankPaths,
}

impl FileBanks {
    /// Creates a bank source over the configured paths.
    #[must_use]
    pub const fn new(paths: BankPaths) -> Self {
        Self { paths }
    }
}

impl BankSource for FileBanks {
    fn read(&self, session: SessionType) -> Result<String, StorageError> {
        let path = self.paths.path(session);
        fs::read_to_string(path).map_err(|err| StorageError::Bank {
            bank: session.to_string(),
            reason: format!("{}: {err}", path.display()),
        })
    }
}
