//! Shared integration-test harness: a scratch kiosk directory with a
//! config file, roster, and banks, plus helpers to run the `raffle` binary
//! against it.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// A temporary kiosk installation.
///
/// Paths in `raffle.yaml` are relative, so they resolve inside the
/// temporary directory. The directory is removed on drop.
pub struct KioskDir {
    dir: TempDir,
}

impl KioskDir {
    /// Creates a kiosk directory using the fixture roster and morning bank.
    #[allow(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::copy(fixture_path("pins.tsv"), dir.path().join("pins.tsv")).unwrap();
        fs::copy(fixture_path("morning.tsv"), dir.path().join("morning.tsv")).unwrap();
        fs::write(
            dir.path().join("raffle.yaml"),
            "roster: pins.tsv\n\
             save_dir: saves\n\
             banks:\n  morning: morning.tsv\n  afternoon: morning.tsv\n  general: morning.tsv\n\
             admin_codes: [\"2020\"]\n",
        )
        .unwrap();
        Self { dir }
    }

    /// Root of the installation.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The configuration file.
    pub fn config(&self) -> PathBuf {
        self.path().join("raffle.yaml")
    }

    /// Where a team's save lands.
    pub fn save_path(&self, code: &str) -> PathBuf {
        self.path().join("saves").join(format!("save{code}.tsv"))
    }

    /// Copies a fixture save into the save directory.
    #[allow(clippy::missing_panics_doc)]
    pub fn install_save(&self, fixture: &str, code: &str) {
        fs::create_dir_all(self.path().join("saves")).unwrap();
        fs::copy(fixture_path(fixture), self.save_path(code)).unwrap();
    }

    /// Runs `raffle --quiet --config raffle.yaml <args>`.
    pub fn run(&self, args: &[&str]) -> Output {
        self.run_with_input(args, "")
    }

    /// Runs the binary with `input` piped to stdin.
    #[allow(clippy::missing_panics_doc)]
    pub fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_raffle"))
            .arg("--quiet")
            .arg("--config")
            .arg(self.config())
            .args(args)
            .env_remove("RAFFLE_SAVE_DIR")
            .env_remove("RAFFLE_ROSTER")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn raffle");

        child
            .stdin
            .take()
            .expect("stdin not captured")
            .write_all(input.as_bytes())
            .unwrap();

        child.wait_with_output().expect("failed to wait for raffle")
    }
}

/// Runs the binary without a kiosk directory.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_raffle"))
        .arg("--quiet")
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run raffle")
}

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Stdout as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
