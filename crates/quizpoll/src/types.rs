//! Wire models exchanged with the backend.
//!
//! These types mirror the JSON payloads of the quiz/poll API (lower-case,
//! underscore-separated keys). The spreadsheet-backed backend sometimes sends
//! numbers as strings, so integer fields that come straight from a cell accept
//! either representation (see [`WireInt`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{DocumentId, SessionError, SheetId};

/// Points deducted from a quiz score for a wrong answer.
pub const COST_OF_WRONG_ANSWER: i64 = 100;

/// Time allowed for each quiz question; whatever is left is the reward for a
/// correct answer.
pub const SECONDS_PER_QUESTION: u32 = 120;

// ---------------------------------------------------------------------------
// Lenient integers
// ---------------------------------------------------------------------------

/// An integer that may arrive on the wire as a JSON number or as a string
/// holding a number (`3` or `"3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireInt(pub i64);

impl<'de> Deserialize<'de> for WireInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Ok(WireInt(value)),
            Raw::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(WireInt)
                .map_err(|_| serde::de::Error::custom(format!("not an integer: {text:?}"))),
        }
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    WireInt::deserialize(deserializer).map(|w| w.0)
}

// ---------------------------------------------------------------------------
// Questions and answers
// ---------------------------------------------------------------------------

/// One answer option of a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Text shown to the participant.
    pub answer_text: String,
    /// Whether this option is (one of) the right answer(s).
    pub correct: bool,
    /// Zero-based position of the option in the source spreadsheet row.
    pub number: u32,
    /// Whether the participant selected this option in the current
    /// submission cycle.
    #[serde(default)]
    pub answered: bool,
}

/// Whether a question has exactly one right answer or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    /// Pick one of X (radio buttons).
    SingleChoice,
    /// Pick Y of X (checkboxes).
    MultipleChoice,
}

/// A question of a quiz or poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text.
    pub question_text: String,
    /// Answer options in display order.
    pub answers: Vec<Answer>,
    /// Zero-based row of the question in the source spreadsheet.
    pub number: u32,
    /// Whether the last submission for this question was fully correct.
    #[serde(default)]
    pub success: bool,
    /// Poll only: responses to this question are recorded without a name.
    #[serde(default)]
    pub anonymous: bool,
}

impl Question {
    /// Single choice when exactly one answer is correct, otherwise multiple
    /// choice.
    pub fn question_type(&self) -> QuestionType {
        let correct = self.answers.iter().filter(|a| a.correct).count();
        if correct == 1 {
            QuestionType::SingleChoice
        } else {
            QuestionType::MultipleChoice
        }
    }

    /// Clears every "answered" flag and the success flag.
    pub fn reset_selection(&mut self) {
        for answer in &mut self.answers {
            answer.answered = false;
        }
        self.success = false;
    }

    /// Records one selection per answer and returns whether the response is
    /// correct.
    ///
    /// The response is correct iff every answer's `correct` flag equals its
    /// selection. Both the per-answer `answered` flags and the question's
    /// `success` flag are overwritten.
    pub fn mark(&mut self, selections: &[bool]) -> Result<bool, SessionError> {
        if selections.len() != self.answers.len() {
            return Err(SessionError::SelectionMismatch {
                expected: self.answers.len(),
                actual: selections.len(),
            });
        }
        let mut correct = true;
        for (answer, &selected) in self.answers.iter_mut().zip(selections) {
            if answer.correct != selected {
                correct = false;
            }
            answer.answered = selected;
        }
        self.success = correct;
        Ok(correct)
    }

    /// Comma-joined 1-based numbers of the selected answers (`""` when none).
    pub fn selected_numbers(&self) -> String {
        self.answers
            .iter()
            .filter(|a| a.answered)
            .map(|a| (a.number + 1).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

// ---------------------------------------------------------------------------
// Quiz
// ---------------------------------------------------------------------------

/// A self-paced quiz game.
///
/// Sent back whole on submission so the backend can update the leaderboard
/// and per-question statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Spreadsheet title (may contain the `[Q]` marker).
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// URL of the cover image.
    pub image: String,
    /// Worksheet holding the leaderboard.
    pub leaderboard_sheet: SheetId,
    /// Worksheet holding per-question statistics.
    pub statistics_sheet: SheetId,
    /// Spreadsheet holding the quiz.
    pub document_id: DocumentId,
    /// Running score of the current play-through.
    #[serde(default)]
    pub score: i64,
    /// Questions in play order.
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Title with the `[Q]` marker removed.
    pub fn display_title(&self) -> String {
        strip_marker(&self.title, "[Q]")
    }

    /// Records the participant's selections for one question and updates the
    /// score: a correct answer earns the seconds left on the clock, a wrong
    /// one costs [`COST_OF_WRONG_ANSWER`].
    pub fn record_answer(
        &mut self,
        index: usize,
        selections: &[bool],
        remaining_secs: u32,
    ) -> Result<bool, SessionError> {
        let count = self.questions.len();
        let question = self
            .questions
            .get_mut(index)
            .ok_or(SessionError::QuestionOutOfRange { index, count })?;
        let correct = question.mark(selections)?;
        if correct {
            self.score += i64::from(remaining_secs);
        } else {
            self.score -= COST_OF_WRONG_ANSWER;
        }
        Ok(correct)
    }
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// An instructor-driven polling session as returned by fetch-poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    /// Spreadsheet title (may contain the `[P]` marker).
    pub title: String,
    /// Worksheet whose first cell holds the current question number.
    pub internal_data_sheet: SheetId,
    /// Worksheet responses are appended to.
    pub responses_sheet: SheetId,
    /// Spreadsheet holding the poll.
    pub document_id: DocumentId,
    /// Questions in instructor order.
    pub questions: Vec<Question>,
}

/// Payload of submit-poll-answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    /// Spreadsheet holding the poll.
    pub document_id: DocumentId,
    /// Responses worksheet.
    pub sheet_id: SheetId,
    /// Whether the response is recorded without the participant's name.
    pub anonymous: bool,
    /// 1-based question number.
    pub question_number: u32,
    /// Comma-joined 1-based answer numbers, or `""`.
    pub answers: String,
    /// Whether the selection matched the correct answers exactly.
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Kind of a [`DocsEntry`]; `0` and `1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DocsEntryKind {
    /// A folder that may hold more quizzes.
    Collection,
    /// A quiz spreadsheet.
    Quiz,
}

impl TryFrom<u8> for DocsEntryKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DocsEntryKind::Collection),
            1 => Ok(DocsEntryKind::Quiz),
            other => Err(format!("unknown document type {other}")),
        }
    }
}

impl From<DocsEntryKind> for u8 {
    fn from(kind: DocsEntryKind) -> Self {
        match kind {
            DocsEntryKind::Collection => 0,
            DocsEntryKind::Quiz => 1,
        }
    }
}

/// One collection or quiz in a document listing.
///
/// Orders collections before quizzes, then alphabetically by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsEntry {
    /// Collection or quiz.
    #[serde(rename = "type")]
    pub kind: DocsEntryKind,
    /// Title with the quiz marker already removed.
    pub title: String,
    /// Collection or document key.
    pub id: String,
}

impl Ord for DocsEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for DocsEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// One row of a quiz leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Participant name.
    pub ldap: String,
    /// Best score of the participant.
    #[serde(deserialize_with = "lenient_int")]
    pub score: i64,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Removes a title marker such as `[Q]` and trims the result.
pub fn strip_marker(title: &str, marker: &str) -> String {
    title.replace(marker, "").trim().to_string()
}
