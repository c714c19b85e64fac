//! Poll status and the mutable poll session it drives.
//!
//! The backend reports the instructor's position as a single integer. That
//! integer is 1-based on the wire and carries two sentinels; [`PollStatus`]
//! turns it into a closed set of states, and [`PollSession::apply_status`]
//! turns state *changes* into [`Transition`]s. Repeating the current status
//! is always a no-op.

use serde::{Deserialize, Serialize};

use crate::types::strip_marker;
use crate::{DocumentId, Poll, PollResponse, Question, SessionError, SheetId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Where the instructor currently is, from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    /// Nothing has been observed since the poll screen became active.
    Unknown,
    /// The instructor is not accepting answers right now.
    WaitingForInstructor,
    /// The poll is over.
    Closed,
    /// Zero-based index of the open question.
    Question(usize),
}

impl PollStatus {
    /// Client-side value of [`PollStatus::WaitingForInstructor`]; also sent
    /// unchanged on the wire.
    pub const WAITING_FOR_INSTRUCTOR: i64 = -1;
    /// Client-side value of [`PollStatus::Closed`]; also sent unchanged on the
    /// wire.
    pub const CLOSED: i64 = -2;
    /// Client-side value of [`PollStatus::Unknown`]. Never sent by the backend.
    pub const UNKNOWN: i64 = -3;

    /// Converts a wire value to the client's 0-based convention.
    ///
    /// The two sentinels pass through unchanged; every other value is
    /// decremented by one. Returns `None` when that would underflow.
    pub fn normalize_wire(value: i64) -> Option<i64> {
        if value == Self::WAITING_FOR_INSTRUCTOR || value == Self::CLOSED {
            Some(value)
        } else {
            value.checked_sub(1)
        }
    }

    /// Interprets a client-side (already normalised) value.
    ///
    /// Returns `None` for negative values that are not sentinels.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            Self::WAITING_FOR_INSTRUCTOR => Some(PollStatus::WaitingForInstructor),
            Self::CLOSED => Some(PollStatus::Closed),
            Self::UNKNOWN => Some(PollStatus::Unknown),
            v if v >= 0 => usize::try_from(v).ok().map(PollStatus::Question),
            _ => None,
        }
    }

    /// Decodes a raw wire value in one step.
    pub fn from_wire(value: i64) -> Option<Self> {
        Self::normalize_wire(value).and_then(Self::from_value)
    }

    /// Client-side integer value of this status.
    pub fn value(self) -> i64 {
        match self {
            PollStatus::Unknown => Self::UNKNOWN,
            PollStatus::WaitingForInstructor => Self::WAITING_FOR_INSTRUCTOR,
            PollStatus::Closed => Self::CLOSED,
            PollStatus::Question(index) => index as i64,
        }
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollStatus::Unknown => write!(f, "unknown"),
            PollStatus::WaitingForInstructor => write!(f, "waiting for instructor"),
            PollStatus::Closed => write!(f, "closed"),
            PollStatus::Question(index) => write!(f, "question {}", index + 1),
        }
    }
}

/// A change of [`PollStatus`] the presentation must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Show the question at this zero-based index with fresh selections.
    ShowQuestion(usize),
    /// Show the waiting screen.
    ShowWaiting,
    /// Show the closed screen; polling stops.
    ShowClosed,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A loaded poll plus the last status observed for it.
///
/// Owned by whoever drives the active poll screen; there is never more than
/// one owner at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSession {
    poll: Poll,
    current: PollStatus,
}

impl PollSession {
    /// Wraps a freshly fetched poll. The status starts as
    /// [`PollStatus::Unknown`].
    pub fn new(poll: Poll) -> Self {
        Self {
            poll,
            current: PollStatus::Unknown,
        }
    }

    /// Forgets the last observed status so the next one always produces a
    /// transition.
    pub fn reset(&mut self) {
        self.current = PollStatus::Unknown;
    }

    /// Last observed status.
    pub fn current(&self) -> PollStatus {
        self.current
    }

    /// Returns `true` once the poll has been observed closed.
    pub fn is_closed(&self) -> bool {
        self.current == PollStatus::Closed
    }

    /// Spreadsheet holding the poll.
    pub fn document_id(&self) -> &DocumentId {
        &self.poll.document_id
    }

    /// Worksheet polled for the current status.
    pub fn status_sheet(&self) -> &SheetId {
        &self.poll.internal_data_sheet
    }

    /// Worksheet answers are submitted to.
    pub fn responses_sheet(&self) -> &SheetId {
        &self.poll.responses_sheet
    }

    /// All questions of the poll.
    pub fn questions(&self) -> &[Question] {
        &self.poll.questions
    }

    /// Title with the `[P]` marker removed.
    pub fn display_title(&self) -> String {
        strip_marker(&self.poll.title, "[P]")
    }

    /// Public link that opens this poll, e.g. for sharing by QR code.
    pub fn share_url(&self, broker_url: &str) -> String {
        format!(
            "{}/poll/{}",
            broker_url.trim_end_matches('/'),
            self.poll.document_id
        )
    }

    /// The question currently open, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match self.current {
            PollStatus::Question(index) => self.poll.questions.get(index),
            _ => None,
        }
    }

    /// Records a newly observed status.
    ///
    /// Returns `Ok(None)` when the status equals the current one. A question
    /// index beyond the loaded questions is rejected without changing state.
    /// Showing a question clears any selection previously recorded for it.
    pub fn apply_status(&mut self, status: PollStatus) -> Result<Option<Transition>, SessionError> {
        if status == self.current {
            return Ok(None);
        }
        let transition = match status {
            PollStatus::Unknown => {
                self.current = status;
                return Ok(None);
            }
            PollStatus::WaitingForInstructor => Transition::ShowWaiting,
            PollStatus::Closed => Transition::ShowClosed,
            PollStatus::Question(index) => {
                let count = self.poll.questions.len();
                let question = self
                    .poll
                    .questions
                    .get_mut(index)
                    .ok_or(SessionError::QuestionOutOfRange { index, count })?;
                question.reset_selection();
                Transition::ShowQuestion(index)
            }
        };
        tracing::debug!(from = %self.current, to = %status, "poll status changed");
        self.current = status;
        Ok(Some(transition))
    }

    /// Marks the open question with one selection per answer and builds the
    /// submit-poll-answer payload for it.
    pub fn answer(&mut self, selections: &[bool]) -> Result<PollResponse, SessionError> {
        let PollStatus::Question(index) = self.current else {
            return Err(SessionError::NoOpenQuestion);
        };
        let count = self.poll.questions.len();
        let question = self
            .poll
            .questions
            .get_mut(index)
            .ok_or(SessionError::QuestionOutOfRange { index, count })?;
        let success = question.mark(selections)?;
        Ok(PollResponse {
            document_id: self.poll.document_id.clone(),
            sheet_id: self.poll.responses_sheet.clone(),
            anonymous: question.anonymous,
            question_number: index as u32 + 1,
            answers: question.selected_numbers(),
            success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Answer;

    fn poll(questions: usize) -> Poll {
        Poll {
            title: "[P] Lecture 3".to_string(),
            internal_data_sheet: SheetId::new("od7").unwrap(),
            responses_sheet: SheetId::new("od8").unwrap(),
            document_id: DocumentId::new("doc-1").unwrap(),
            questions: (0..questions)
                .map(|n| Question {
                    question_text: format!("Q{n}"),
                    answers: [("a", true), ("b", false), ("c", true)]
                        .into_iter()
                        .zip(0..)
                        .map(|((text, correct), number)| Answer {
                            answer_text: text.into(),
                            correct,
                            number,
                            answered: false,
                        })
                        .collect(),
                    number: n as u32,
                    success: false,
                    anonymous: n == 1,
                })
                .collect(),
        }
    }

    #[test]
    fn sentinels_are_never_decremented() {
        assert_eq!(PollStatus::normalize_wire(-1), Some(-1));
        assert_eq!(PollStatus::normalize_wire(-2), Some(-2));
        for v in [-7, -3, 0, 1, 2, 40] {
            assert_eq!(PollStatus::normalize_wire(v), Some(v - 1));
        }
    }

    #[test]
    fn lowest_wire_value_does_not_underflow() {
        assert_eq!(PollStatus::normalize_wire(i64::MIN), None);
        assert_eq!(PollStatus::from_wire(i64::MIN), None);
    }

    #[test]
    fn wire_values_decode_to_states() {
        assert_eq!(PollStatus::from_wire(-1), Some(PollStatus::WaitingForInstructor));
        assert_eq!(PollStatus::from_wire(-2), Some(PollStatus::Closed));
        assert_eq!(PollStatus::from_wire(1), Some(PollStatus::Question(0)));
        assert_eq!(PollStatus::from_wire(4), Some(PollStatus::Question(3)));
        // 0 - 1 lands on the waiting sentinel.
        assert_eq!(PollStatus::from_wire(0), Some(PollStatus::WaitingForInstructor));
        assert_eq!(PollStatus::from_wire(-9), None);
    }

    #[test]
    fn repeated_status_is_a_no_op() {
        let mut session = PollSession::new(poll(3));
        assert_eq!(
            session.apply_status(PollStatus::Question(1)).unwrap(),
            Some(Transition::ShowQuestion(1))
        );
        for _ in 0..5 {
            assert_eq!(session.apply_status(PollStatus::Question(1)).unwrap(), None);
        }
        assert_eq!(
            session.apply_status(PollStatus::WaitingForInstructor).unwrap(),
            Some(Transition::ShowWaiting)
        );
        assert_eq!(
            session.apply_status(PollStatus::Closed).unwrap(),
            Some(Transition::ShowClosed)
        );
        assert!(session.is_closed());
    }

    #[test]
    fn reset_makes_the_same_status_transition_again() {
        let mut session = PollSession::new(poll(2));
        session.apply_status(PollStatus::Question(0)).unwrap();
        session.reset();
        assert_eq!(session.current(), PollStatus::Unknown);
        assert_eq!(
            session.apply_status(PollStatus::Question(0)).unwrap(),
            Some(Transition::ShowQuestion(0))
        );
    }

    #[test]
    fn out_of_range_question_leaves_state_untouched() {
        let mut session = PollSession::new(poll(2));
        session.apply_status(PollStatus::WaitingForInstructor).unwrap();
        assert_eq!(
            session.apply_status(PollStatus::Question(5)),
            Err(SessionError::QuestionOutOfRange { index: 5, count: 2 })
        );
        assert_eq!(session.current(), PollStatus::WaitingForInstructor);
    }

    #[test]
    fn answer_builds_the_wire_payload() {
        let mut session = PollSession::new(poll(2));
        session.apply_status(PollStatus::Question(1)).unwrap();
        let response = session.answer(&[true, false, true]).unwrap();
        assert_eq!(response.question_number, 2);
        assert_eq!(response.answers, "1,3");
        assert!(response.success);
        assert!(response.anonymous);
        assert_eq!(response.sheet_id.as_str(), "od8");

        let response = session.answer(&[true, true, false]).unwrap();
        assert_eq!(response.answers, "1,2");
        assert!(!response.success);
    }

    #[test]
    fn unanswered_question_submits_empty_answers() {
        let mut session = PollSession::new(poll(1));
        session.apply_status(PollStatus::Question(0)).unwrap();
        let response = session.answer(&[false, false, false]).unwrap();
        let json = serde_json::to_string(&response).unwrap();
        let decoded: PollResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.answers, "");
        assert!(!decoded.success);
    }

    #[test]
    fn showing_a_question_clears_earlier_selections() {
        let mut session = PollSession::new(poll(1));
        session.apply_status(PollStatus::Question(0)).unwrap();
        session.answer(&[true, true, true]).unwrap();
        session.apply_status(PollStatus::WaitingForInstructor).unwrap();
        session.apply_status(PollStatus::Question(0)).unwrap();
        let question = session.current_question().unwrap();
        assert!(question.answers.iter().all(|a| !a.answered));
        assert!(!question.success);
    }

    #[test]
    fn answering_without_an_open_question_fails() {
        let mut session = PollSession::new(poll(1));
        assert_eq!(session.answer(&[true]), Err(SessionError::NoOpenQuestion));
    }

    #[test]
    fn display_helpers() {
        let session = PollSession::new(poll(1));
        assert_eq!(session.display_title(), "Lecture 3");
        assert_eq!(
            session.share_url("http://quiz-n-poll.appspot.com/"),
            "http://quiz-n-poll.appspot.com/poll/doc-1"
        );
    }
}
