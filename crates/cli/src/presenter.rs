//! Terminal rendering of poll transitions.

use std::io::Write;
use std::sync::Mutex;

use quizpoll::{PollPresenter, Question, QuestionType, QuizPollError};

/// Prints poll screens as plain text.
///
/// Also remembers how many answers the open question has, so typed input can
/// be turned into one selection per answer.
pub struct ConsolePresenter<W> {
    out: Mutex<W>,
    open_answers: Mutex<Option<usize>>,
}

impl ConsolePresenter<std::io::Stdout> {
    /// A presenter writing to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    /// A presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            open_answers: Mutex::new(None),
        }
    }

    /// Answer count of the question on screen, if one is open.
    pub fn open_answer_count(&self) -> Option<usize> {
        self.open_answers.lock().ok().and_then(|open| *open)
    }

    fn set_open(&self, answers: Option<usize>) {
        if let Ok(mut open) = self.open_answers.lock() {
            *open = answers;
        }
    }

    fn print(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(err) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::warn!(error = %err, "failed to write to terminal");
        }
    }
}

/// The question with numbered answers and an input hint.
pub fn render_question(number: usize, question: &Question) -> String {
    let mut text = format!("\nQuestion {number}: {}\n", question.question_text);
    for (i, answer) in question.answers.iter().enumerate() {
        text.push_str(&format!("  {}. {}\n", i + 1, answer.answer_text));
    }
    let hint = match question.question_type() {
        QuestionType::SingleChoice => "Enter one answer number",
        QuestionType::MultipleChoice => "Enter answer numbers separated by commas",
    };
    text.push_str(hint);
    text.push_str(":\n");
    text
}

impl<W: Write + Send> PollPresenter for ConsolePresenter<W> {
    fn show_question(&self, index: usize, question: &Question) {
        self.set_open(Some(question.answers.len()));
        self.print(&render_question(index + 1, question));
    }

    fn show_waiting(&self) {
        self.set_open(None);
        self.print("\nWaiting for the instructor...\n");
    }

    fn show_closed(&self) {
        self.set_open(None);
        self.print("\nThe poll is closed. Thank you!\n");
    }

    fn show_error(&self, error: &QuizPollError) {
        self.print(&format!("\nError: {}\n", error.user_message()));
    }
}

#[cfg(test)]
mod tests {
    use quizpoll::{Answer, ErrorKind};

    use super::*;

    fn question(correct: &[bool]) -> Question {
        Question {
            question_text: "Pick".to_string(),
            answers: correct
                .iter()
                .enumerate()
                .map(|(n, &correct)| Answer {
                    answer_text: format!("option {n}"),
                    correct,
                    number: n as u32,
                    answered: false,
                })
                .collect(),
            number: 0,
            success: false,
            anonymous: false,
        }
    }

    fn output(presenter: ConsolePresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn question_is_numbered_from_one() {
        let presenter = ConsolePresenter::new(Vec::new());
        presenter.show_question(0, &question(&[true, false]));
        let text = output(presenter);
        assert!(text.contains("Question 1: Pick"));
        assert!(text.contains("  2. option 1"));
        assert!(text.contains("Enter one answer number"));
    }

    #[test]
    fn open_question_is_tracked_until_waiting() {
        let presenter = ConsolePresenter::new(Vec::new());
        assert_eq!(presenter.open_answer_count(), None);
        presenter.show_question(1, &question(&[true, false, true]));
        assert_eq!(presenter.open_answer_count(), Some(3));
        presenter.show_waiting();
        assert_eq!(presenter.open_answer_count(), None);
    }

    #[test]
    fn multiple_choice_asks_for_several_numbers() {
        let text = render_question(3, &question(&[true, false, true]));
        assert!(text.contains("separated by commas"));
    }

    #[test]
    fn errors_use_the_user_message() {
        let presenter = ConsolePresenter::new(Vec::new());
        presenter.show_error(&QuizPollError::Request(ErrorKind::UpgradeRequired));
        assert!(output(presenter).contains(ErrorKind::UpgradeRequired.user_message()));
    }
}
