//! Plain-text session encoding.
//!
//! Saves and snapshots are line oriented:
//!
//! ```text
//! TEAM:<login_code>:<tickets_redeemed>
//! CATEGORY:<name>:<LOCKED|UNLOCKED>
//! <name>\t<prompt>\t<answer>\t<distractor1>\t<distractor2>\t<distractor3>\t<user_answer>
//! ```
//!
//! Reference banks carry only the tab-delimited question rows, without the
//! user-answer column. This module owns the delimiters, the field splitter,
//! and the per-line classifier shared by the engine and validation tooling.

use crate::error::RowError;

/// Delimiter between the fields of a question row.
pub const FIELD_DELIMITER: char = '\t';

/// Delimiter between the components of a `TEAM:` or `CATEGORY:` header.
pub const HEADER_DELIMITER: char = ':';

/// Keyword opening the team header line.
pub const TEAM_KEYWORD: &str = "TEAM";

/// Keyword opening a category header line.
pub const CATEGORY_KEYWORD: &str = "CATEGORY";

/// Lock state marker for a locked category.
pub const LOCKED: &str = "LOCKED";

/// Lock state marker for an unlocked category.
pub const UNLOCKED: &str = "UNLOCKED";

/// Field count of a question row without an answer column.
pub const QUESTION_FIELDS: usize = 6;

/// Field count of a question row carrying the user's answer.
pub const ANSWERED_QUESTION_FIELDS: usize = 7;

/// Splits a row on [`FIELD_DELIMITER`], discarding trailing empty fields.
///
/// A trailing delimiter therefore never produces an empty seventh field, so
/// `"Math\tQ\t4\t3\t5\t6\t"` is a six-field (unanswered) row. An empty line
/// is a single empty field.
#[must_use]
pub fn split_fields(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return vec![line];
    }

    let mut fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Returns `true` if `count` is a valid question row field count.
#[must_use]
pub const fn is_question_field_count(count: usize) -> bool {
    count == QUESTION_FIELDS || count == ANSWERED_QUESTION_FIELDS
}

/// One classified line of session text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `TEAM:<code>:<tickets>`
    Team {
        /// Login code the save belongs to
        code: &'a str,
        /// Number of tickets already redeemed
        tickets_redeemed: i64,
    },
    /// `CATEGORY:<name>:<state>`
    Category {
        /// Category name
        name: &'a str,
        /// `true` only when the state marker reads `LOCKED`
        locked: bool,
        /// `true` if the state marker was neither `LOCKED` nor `UNLOCKED`
        unrecognized_state: bool,
    },
    /// A 6 or 7 field question row, routed by its first field
    Question {
        /// Category name taken from field 0
        category: &'a str,
        /// The full row, handed on to `Question::parse`
        row: &'a str,
    },
    /// Blank or single-field line
    Skip,
}

/// Classifies a single line of session or bank text.
///
/// The line is first split on `:`; a `TEAM` or `CATEGORY` first token makes
/// it a header. Otherwise it is split on tabs and treated as a question row
/// if it has 6 or 7 fields. Blank and single-field lines are skipped.
///
/// # Errors
///
/// Returns [`RowError`] for headers that are missing components or carry a
/// non-integer ticket count, and for tab-delimited rows with the wrong
/// number of fields.
pub fn classify(line: &str) -> Result<Line<'_>, RowError> {
    let head = line.split(HEADER_DELIMITER).next().unwrap_or_default();

    if head == TEAM_KEYWORD {
        return parse_team_header(line);
    }

    if head == CATEGORY_KEYWORD {
        return parse_category_header(line);
    }

    let fields = split_fields(line);
    match fields.len() {
        n if is_question_field_count(n) => Ok(Line::Question {
            category: fields[0],
            row: line,
        }),
        0 | 1 => Ok(Line::Skip),
        found => Err(RowError::FieldCount {
            expected: "6 or 7",
            found,
        }),
    }
}

fn parse_team_header(line: &str) -> Result<Line<'_>, RowError> {
    let mut parts = line.splitn(3, HEADER_DELIMITER).skip(1);
    let (Some(code), Some(tickets)) = (parts.next(), parts.next()) else {
        return Err(RowError::Header {
            kind: TEAM_KEYWORD,
        });
    };

    let tickets_redeemed = tickets
        .trim()
        .parse::<i64>()
        .map_err(|_| RowError::TicketCount(tickets.to_string()))?;

    Ok(Line::Team {
        code,
        tickets_redeemed,
    })
}

fn parse_category_header(line: &str) -> Result<Line<'_>, RowError> {
    // The lock state is the last component, so names may contain ':'.
    let rest = &line[CATEGORY_KEYWORD.len()..];
    let Some((name, state)) = rest
        .strip_prefix(HEADER_DELIMITER)
        .and_then(|r| r.rsplit_once(HEADER_DELIMITER))
    else {
        return Err(RowError::Header {
            kind: CATEGORY_KEYWORD,
        });
    };

    Ok(Line::Category {
        name,
        locked: state == LOCKED,
        unrecognized_state: state != LOCKED && state != UNLOCKED,
    })
}

/// Formats the team header line (without the line break).
#[must_use]
pub fn team_header(code: &str, tickets_redeemed: i64) -> String {
    format!("{TEAM_KEYWORD}{HEADER_DELIMITER}{code}{HEADER_DELIMITER}{tickets_redeemed}")
}

/// Formats a category header line (without the line break).
#[must_use]
pub fn category_header(name: &str, locked: bool) -> String {
    let state = if locked { LOCKED } else { UNLOCKED };
    format!("{CATEGORY_KEYWORD}{HEADER_DELIMITER}{name}{HEADER_DELIMITER}{state}")
}
