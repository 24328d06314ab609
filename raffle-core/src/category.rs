//! A named, lockable bank of questions.

use std::fmt;

use rand::Rng;
use tracing::debug;

use crate::error::RowError;
use crate::format::{FIELD_DELIMITER, category_header, is_question_field_count, split_fields};
use crate::question::Question;

/// Name of the placeholder category returned when no category qualifies.
pub const DEFAULT_CATEGORY: &str = "Empty";

/// An ordered bank of questions behind a lock.
///
/// Questions keep the order they were read in. Categories start locked and
/// are unlocked as the team progresses; nothing in normal play locks one
/// again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    locked: bool,
    questions: Vec<Question>,
}

impl Default for Category {
    /// An empty, locked category named [`DEFAULT_CATEGORY`].
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY)
    }
}

impl Category {
    /// Creates an empty, locked category.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_lock(name, true)
    }

    /// Creates an empty category with the given lock state.
    #[must_use]
    pub fn with_lock(name: impl Into<String>, locked: bool) -> Self {
        Self {
            name: name.into(),
            locked,
            questions: Vec::new(),
        }
    }

    /// Builds a category from a bare name or from a question row.
    ///
    /// A single field is taken as the category name. A 6 or 7 field row
    /// names the category in field 0 and becomes its first question.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::FieldCount`] for any other field count.
    pub fn parse_or_named(line: &str) -> Result<Self, RowError> {
        let fields = split_fields(line);

        match fields.len() {
            1 => Ok(Self::new(fields[0])),
            n if is_question_field_count(n) => {
                let mut category = Self::new(fields[0]);
                category.add_question(line);
                Ok(category)
            }
            found => Err(RowError::FieldCount {
                expected: "1, 6 or 7",
                found,
            }),
        }
    }

    /// Adds the question encoded in `row`.
    ///
    /// Rows for another category, rows with the wrong field count or an
    /// empty choice, and exact duplicates (including the user answer) are
    /// ignored. Returns `true` if the question was added.
    pub fn add_question(&mut self, row: &str) -> bool {
        let question = match self.check_row(row) {
            Ok(question) => question,
            Err(err) => {
                debug!(category = %self.name, %err, "row not added");
                return false;
            }
        };

        if self.questions.contains(&question) {
            debug!(category = %self.name, prompt = question.prompt(), "duplicate question ignored");
            return false;
        }

        self.questions.push(question);
        true
    }

    fn check_row(&self, row: &str) -> Result<Question, RowError> {
        let fields = split_fields(row);
        if !is_question_field_count(fields.len()) {
            return Err(RowError::FieldCount {
                expected: "6 or 7",
                found: fields.len(),
            });
        }
        if fields[0] != self.name {
            return Err(RowError::WrongCategory {
                expected: self.name.clone(),
                found: fields[0].to_string(),
            });
        }
        Question::try_parse(row)
    }

    /// The category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All questions in insertion order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The question at `index`.
    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Mutable access to the question at `index`.
    pub fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    /// Number of questions.
    #[must_use]
    pub fn count_total(&self) -> usize {
        self.questions.len()
    }

    /// Number of answered questions, correct or not.
    #[must_use]
    pub fn count_answered(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered()).count()
    }

    /// Number of unanswered questions.
    #[must_use]
    pub fn count_available(&self) -> usize {
        self.count_total() - self.count_answered()
    }

    /// Number of correctly answered questions.
    #[must_use]
    pub fn count_correct(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct()).count()
    }

    /// Returns `true` while at least one question is unanswered.
    #[must_use]
    pub fn has_questions_available(&self) -> bool {
        self.questions.iter().any(|q| !q.is_answered())
    }

    /// Index of the question whose prompt text is `prompt`.
    #[must_use]
    pub fn position_of(&self, prompt: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.matches_prompt(prompt))
    }

    /// The question whose prompt text is `prompt`.
    #[must_use]
    pub fn find_question(&self, prompt: &str) -> Option<&Question> {
        self.position_of(prompt).map(|i| &self.questions[i])
    }

    /// Index of the first unanswered question.
    #[must_use]
    pub fn next_unanswered_index(&self) -> Option<usize> {
        self.questions.iter().position(|q| !q.is_answered())
    }

    /// The first unanswered question in insertion order.
    #[must_use]
    pub fn next_unanswered_in_order(&self) -> Option<&Question> {
        self.next_unanswered_index().map(|i| &self.questions[i])
    }

    /// Index of a uniformly random unanswered question.
    ///
    /// Samples indices until an unanswered one turns up. Availability is
    /// checked first, so an exhausted category returns `None` immediately.
    pub fn random_unanswered_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if !self.has_questions_available() {
            debug!(category = %self.name, "no unanswered questions");
            return None;
        }

        loop {
            let index = rng.random_range(0..self.questions.len());
            if !self.questions[index].is_answered() {
                return Some(index);
            }
        }
    }

    /// A uniformly random unanswered question.
    pub fn random_unanswered<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Question> {
        self.random_unanswered_index(rng).map(|i| &self.questions[i])
    }

    /// Returns `true` if the category is locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns `true` if the category is unlocked.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        !self.locked
    }

    /// Locks the category. Questions are untouched.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Unlocks the category. Questions are untouched.
    pub fn unlock(&mut self) {
        debug!(category = %self.name, "category unlocked");
        self.locked = false;
    }

    /// Encodes the category header followed by one line per question.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", category_header(&self.name, self.locked))?;
        for question in &self.questions {
            writeln!(f, "{}{FIELD_DELIMITER}{question}", self.name)?;
        }
        Ok(())
    }
}
