//! The closed set of operations and their route table.

use quizpoll::Service;
use transport::Method;

/// Every kind of request the client can issue.
///
/// Immutable once a request is built. Matching on this enum is exhaustive, so
/// adding an operation forces every route, build, and decode site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Exchange a platform artifact for an application-backend session cookie.
    Login,
    /// List collections and quizzes inside a collection.
    FetchDocuments,
    /// List the caller's own quizzes from the document service.
    FetchMyDocuments,
    /// Load a quiz.
    FetchQuiz,
    /// Load a quiz leaderboard.
    FetchLeaderboard,
    /// Submit a finished quiz (score and statistics).
    SubmitQuiz,
    /// Load a poll.
    FetchPoll,
    /// Read the instructor's current position in a poll.
    FetchPollStatus,
    /// Submit one poll answer.
    SubmitPollAnswer,
}

/// Method and path template of an operation.
///
/// `{name}` placeholders are filled with percent-encoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// HTTP method; POST iff the operation carries a body.
    pub method: Method,
    /// Path relative to the service base URL.
    pub template: &'static str,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Operation; 9] = [
        Operation::Login,
        Operation::FetchDocuments,
        Operation::FetchMyDocuments,
        Operation::FetchQuiz,
        Operation::FetchLeaderboard,
        Operation::SubmitQuiz,
        Operation::FetchPoll,
        Operation::FetchPollStatus,
        Operation::SubmitPollAnswer,
    ];

    /// Stable name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::FetchDocuments => "fetch-documents",
            Operation::FetchMyDocuments => "fetch-my-documents",
            Operation::FetchQuiz => "fetch-quiz",
            Operation::FetchLeaderboard => "fetch-leaderboard",
            Operation::SubmitQuiz => "submit-quiz",
            Operation::FetchPoll => "fetch-poll",
            Operation::FetchPollStatus => "fetch-poll-status",
            Operation::SubmitPollAnswer => "submit-poll-answer",
        }
    }

    /// The service that answers this operation.
    pub fn service(self) -> Service {
        match self {
            Operation::FetchMyDocuments => Service::DocumentService,
            _ => Service::AppBackend,
        }
    }

    /// Method and path template.
    pub fn route(self) -> Route {
        let (method, template) = match self {
            Operation::Login => (Method::Get, "/_ah/login"),
            Operation::FetchDocuments => (Method::Get, "/qp_api/documents/{collection_id}"),
            // The document service is addressed by its configured feed URL.
            Operation::FetchMyDocuments => (Method::Get, ""),
            Operation::FetchQuiz => (Method::Get, "/qp_api/quiz/{document_id}"),
            Operation::FetchLeaderboard => {
                (Method::Get, "/qp_api/quiz/leaderboard/{document_id}/{sheet_id}")
            }
            Operation::SubmitQuiz => (Method::Post, "/qp_api/quiz/submit"),
            Operation::FetchPoll => (Method::Get, "/qp_api/poll/{document_id}"),
            Operation::FetchPollStatus => {
                (Method::Get, "/qp_api/poll/status/{document_id}/{sheet_id}")
            }
            Operation::SubmitPollAnswer => (Method::Post, "/qp_api/poll/submit"),
        };
        Route { method, template }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fills `{name}` placeholders in `template` with percent-encoded values.
pub(crate) fn expand(template: &str, params: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        let placeholder = format!("{{{name}}}");
        path = path.replace(&placeholder, &urlencoding::encode(value));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_submissions_carry_a_body() {
        for op in Operation::ALL {
            let expects_post = matches!(op, Operation::SubmitQuiz | Operation::SubmitPollAnswer);
            assert_eq!(op.route().method == Method::Post, expects_post, "{op}");
        }
    }

    #[test]
    fn only_my_documents_goes_to_the_document_service() {
        for op in Operation::ALL {
            let docs = op == Operation::FetchMyDocuments;
            assert_eq!(op.service() == Service::DocumentService, docs, "{op}");
        }
    }

    #[test]
    fn placeholders_are_percent_encoded() {
        let path = expand(
            Operation::FetchLeaderboard.route().template,
            &[("document_id", "a b/c"), ("sheet_id", "od7")],
        );
        assert_eq!(path, "/qp_api/quiz/leaderboard/a%20b%2Fc/od7");
    }
}
