//! Offline checks for question banks, saves, and rosters.
//!
//! Reports every malformed line with its line number. The kiosk itself
//! skips such lines with a warning, so this is the place to catch them
//! before an event.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use raffle_core::format::{self, ANSWERED_QUESTION_FIELDS, Line};
use raffle_core::{Question, TeamDirectory};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::args::{FileKind, OutputFormat, ValidateArgs};
use crate::error::RaffleError;

/// A problem found on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// 1-based line number, or `None` for whole-file problems
    pub line: Option<usize>,
    /// What is wrong
    pub message: String,
}

impl Issue {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn file(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

/// Validation result for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File that was checked
    pub path: PathBuf,
    /// Kind the file was checked as
    pub kind: &'static str,
    /// Question rows or roster entries accepted
    pub records: usize,
    /// Problems found
    pub issues: Vec<Issue>,
}

impl FileReport {
    /// Returns `true` if no problems were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

const fn kind_name(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Bank => "bank",
        FileKind::Save => "save",
        FileKind::Roster => "roster",
    }
}

/// Validate the given files.
///
/// # Errors
///
/// Returns [`RaffleError::Invalid`] if any file has problems, or a JSON
/// error if the report cannot be serialized.
pub fn run(args: &ValidateArgs) -> Result<(), RaffleError> {
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(path, args.kind))
        .collect();

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let failed = reports.iter().filter(|r| !r.is_valid()).count();
    if failed > 0 {
        return Err(RaffleError::Invalid {
            failed,
            checked: reports.len(),
        });
    }
    Ok(())
}

fn print_human(report: &FileReport) {
    if report.is_valid() {
        println!(
            "ok: {} ({}, {} record(s))",
            report.path.display(),
            report.kind,
            report.records
        );
        return;
    }

    println!("FAIL: {} ({})", report.path.display(), report.kind);
    for issue in &report.issues {
        match issue.line {
            Some(line) => println!("  line {line}: {}", issue.message),
            None => println!("  {}", issue.message),
        }
    }
}

/// Reads and checks one file.
#[must_use]
pub fn check_file(path: &Path, kind: FileKind) -> FileReport {
    let (records, issues) = match fs::read_to_string(path) {
        Ok(text) => match kind {
            FileKind::Bank => check_bank(&text),
            FileKind::Save => check_save(&text),
            FileKind::Roster => check_roster(&text),
        },
        Err(err) => {
            warn!(path = %path.display(), %err, "cannot read file");
            (0, vec![Issue::file(format!("cannot read file: {err}"))])
        }
    };
    debug!(path = %path.display(), records, issues = issues.len(), "file checked");

    FileReport {
        path: path.to_path_buf(),
        kind: kind_name(kind),
        records,
        issues,
    }
}

/// Checks reference bank text. Banks hold only unanswered question rows.
#[must_use]
pub fn check_bank(text: &str) -> (usize, Vec<Issue>) {
    let mut records = 0;
    let mut issues = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        match format::classify(line) {
            Ok(Line::Question { row, .. }) => {
                if format::split_fields(row).len() == ANSWERED_QUESTION_FIELDS {
                    issues.push(Issue::at(number, "bank row carries an answer column"));
                } else if let Err(err) = Question::try_parse(row) {
                    issues.push(Issue::at(number, err.to_string()));
                } else {
                    records += 1;
                }
            }
            Ok(Line::Team { .. } | Line::Category { .. }) => {
                issues.push(Issue::at(number, "headers belong in saves, not banks"));
            }
            Ok(Line::Skip) => {}
            Err(err) => issues.push(Issue::at(number, err.to_string())),
        }
    }

    (records, issues)
}

/// Checks save text: a `TEAM` header first, then categories and rows.
#[must_use]
pub fn check_save(text: &str) -> (usize, Vec<Issue>) {
    let mut records = 0;
    let mut issues = Vec::new();
    let mut seen_team = false;

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        match format::classify(line) {
            Ok(Line::Team { .. }) if seen_team => {
                issues.push(Issue::at(number, "second TEAM header"));
            }
            Ok(Line::Team { .. }) => seen_team = true,
            Ok(Line::Category {
                name,
                unrecognized_state: true,
                ..
            }) => {
                issues.push(Issue::at(
                    number,
                    format!("category {name} has an unknown lock state"),
                ));
            }
            Ok(Line::Category { .. } | Line::Skip) => {}
            Ok(Line::Question { row, .. }) => match Question::try_parse(row) {
                Ok(_) => records += 1,
                Err(err) => issues.push(Issue::at(number, err.to_string())),
            },
            Err(err) => issues.push(Issue::at(number, err.to_string())),
        }
    }

    if !seen_team {
        issues.push(Issue::file("missing TEAM header"));
    }

    (records, issues)
}

/// Checks roster text: three fields per team and no login code used twice.
#[must_use]
pub fn check_roster(text: &str) -> (usize, Vec<Issue>) {
    let mut directory = TeamDirectory::new();
    let mut issues = Vec::new();
    let mut codes: HashMap<String, usize> = HashMap::new();

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = directory.add_line(line) {
            issues.push(Issue::at(number, err.to_string()));
            continue;
        }

        for code in format::split_fields(line).iter().skip(1).take(2) {
            let code = code.trim();
            if code.is_empty() {
                continue;
            }
            if let Some(first) = codes.insert(code.to_string(), number) {
                issues.push(Issue::at(
                    number,
                    format!("login code {code} already used on line {first}"),
                ));
            }
        }
    }

    (directory.len(), issues)
}
