//! A single four-choice trivia question.

use std::fmt;

use rand::Rng;
use tracing::warn;

use crate::error::RowError;
use crate::format::{FIELD_DELIMITER, QUESTION_FIELDS, is_question_field_count, split_fields};

/// User answer of a question that has not been answered yet.
pub const UNANSWERED: &str = "UNANSWERED";

/// Prompt of the default (placeholder) question.
pub const DEFAULT_QUESTION: &str = "DEFAULT_QUESTION";
/// Answer of the default question.
pub const DEFAULT_ANSWER: &str = "DEFAULT_ANSWER";
/// User answer of the default question.
pub const DEFAULT_USER_ANSWER: &str = "DEFAULT_USER_ANSWER";
/// Choices of the default question.
pub const DEFAULT_CHOICES: [&str; 4] = [
    "DEFAULT_CHOICE_1",
    "DEFAULT_CHOICE_2",
    "DEFAULT_CHOICE_3",
    "DEFAULT_CHOICE_4",
];

/// Prompt given to a question parsed from a malformed row.
pub const MALFORMED_QUESTION: &str = "QUESTION ERROR";
/// Answer given to a question parsed from a malformed row.
pub const MALFORMED_ANSWER: &str = "ANSWER ERROR";
/// Choices given to a question parsed from a malformed row.
pub const MALFORMED_CHOICES: [&str; 4] = ["ANSWER1", "ANSWER2", "ANSWER3", "ANSWER4"];

/// Names of the row fields that must not be empty, after the category.
const TEXT_FIELDS: [&str; 5] = ["prompt", "answer", "distractor1", "distractor2", "distractor3"];

/// A multiple-choice trivia question and the team's answer to it.
///
/// Equality compares prompt, answer, distractors, and user answer. Use
/// [`Question::matches_prompt`] to compare prompt text alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    prompt: String,
    answer: String,
    distractors: [String; 3],
    user_answer: String,
}

impl Default for Question {
    /// The placeholder question, filled with `DEFAULT_*` markers.
    fn default() -> Self {
        Self::from_markers(
            DEFAULT_QUESTION,
            DEFAULT_ANSWER,
            DEFAULT_CHOICES,
            DEFAULT_USER_ANSWER,
        )
    }
}

impl Question {
    /// Creates an unanswered question.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        answer: impl Into<String>,
        distractors: [&str; 3],
    ) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
            distractors: distractors.map(str::to_string),
            user_answer: UNANSWERED.to_string(),
        }
    }

    /// The question produced by a row with the wrong number of fields.
    #[must_use]
    pub fn malformed() -> Self {
        Self::from_markers(
            MALFORMED_QUESTION,
            MALFORMED_ANSWER,
            MALFORMED_CHOICES,
            UNANSWERED,
        )
    }

    // The answer takes the first choice slot, so only choices 2..4 are kept.
    fn from_markers(prompt: &str, answer: &str, choices: [&str; 4], user_answer: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            answer: answer.to_string(),
            distractors: [
                choices[1].to_string(),
                choices[2].to_string(),
                choices[3].to_string(),
            ],
            user_answer: user_answer.to_string(),
        }
    }

    /// Parses a row of 6 or 7 tab-delimited fields:
    /// `category, prompt, answer, distractor1, distractor2, distractor3, [user_answer]`.
    ///
    /// The category field is not checked here; `Category` validates it.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::FieldCount`] if the row has any other field count,
    /// and [`RowError::EmptyField`] if the prompt or a choice is empty. An
    /// empty choice could be picked as an answer that the save format
    /// cannot store.
    pub fn try_parse(row: &str) -> Result<Self, RowError> {
        let fields = split_fields(row);
        if !is_question_field_count(fields.len()) {
            return Err(RowError::FieldCount {
                expected: "6 or 7",
                found: fields.len(),
            });
        }

        if let Some(field) = TEXT_FIELDS
            .iter()
            .zip(&fields[1..QUESTION_FIELDS])
            .find_map(|(name, value)| value.is_empty().then_some(*name))
        {
            return Err(RowError::EmptyField { field });
        }

        let user_answer = fields.get(QUESTION_FIELDS).copied().unwrap_or(UNANSWERED);

        Ok(Self {
            prompt: fields[1].to_string(),
            answer: fields[2].to_string(),
            distractors: [
                fields[3].to_string(),
                fields[4].to_string(),
                fields[5].to_string(),
            ],
            user_answer: user_answer.to_string(),
        })
    }

    /// Parses a row, falling back to [`Question::malformed`] instead of failing.
    #[must_use]
    pub fn parse(row: &str) -> Self {
        Self::try_parse(row).unwrap_or_else(|err| {
            warn!(%err, row, "malformed question row");
            Self::malformed()
        })
    }

    /// Records the team's answer and returns whether it is correct.
    ///
    /// Nothing prevents answering twice; the later answer wins. An answer
    /// that cannot be written to a save row (empty, or containing a tab or
    /// line break) is not recorded and scores as wrong.
    pub fn submit_answer(&mut self, answer: impl Into<String>) -> bool {
        let answer = answer.into();
        if !is_storable_answer(&answer) {
            warn!(prompt = %self.prompt, "answer cannot be saved, ignoring it");
            return false;
        }
        self.user_answer = answer;
        self.is_correct()
    }

    /// The question text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The correct answer.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// The team's answer, or [`UNANSWERED`].
    #[must_use]
    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    /// Returns `true` once an answer has been submitted.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.user_answer != UNANSWERED
    }

    /// Returns `true` if the submitted answer equals the correct answer.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.user_answer == self.answer
    }

    /// Returns `true` if this question's prompt text equals `prompt`.
    #[must_use]
    pub fn matches_prompt(&self, prompt: &str) -> bool {
        self.prompt == prompt
    }

    /// Returns `true` for the placeholder question.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` for the fallback produced by a malformed row.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.prompt == MALFORMED_QUESTION && self.answer == MALFORMED_ANSWER
    }

    /// Choices as `[answer, distractor1, distractor2, distractor3]`.
    #[must_use]
    pub fn choices_in_canonical_order(&self) -> [String; 4] {
        [
            self.answer.clone(),
            self.distractors[0].clone(),
            self.distractors[1].clone(),
            self.distractors[2].clone(),
        ]
    }

    /// Choices rotated by a uniformly random offset.
    ///
    /// Only the four rotations of the canonical order are reachable: the
    /// distractors keep their relative order while the correct answer can
    /// land in any slot.
    pub fn choices_shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> [String; 4] {
        let mut choices = self.choices_in_canonical_order();
        let offset = rng.random_range(0..choices.len());
        choices.rotate_right(offset);
        choices
    }

    /// Encodes the question as a save-file row, without the category field.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

fn is_storable_answer(answer: &str) -> bool {
    !answer.is_empty() && !answer.contains([FIELD_DELIMITER, '\n', '\r'])
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = FIELD_DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            self.prompt,
            self.answer,
            self.distractors[0],
            self.distractors[1],
            self.distractors[2],
            self.user_answer
        )
    }
}
