//! Application backend: JSON API behind a cookie session.

use quizpoll::{
    AuthArtifact, CollectionId, Credential, DocsEntry, DocumentId, ErrorKind, LeaderboardEntry,
    Poll, PollResponse, PollStatus, Quiz, Service, SheetId, WireInt,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use transport::{RawResponse, RequestSpec};

use crate::api::{malformed, OperationRequest, ServiceApi};
use crate::operation::expand;
use crate::Operation;

/// Payload of an application-backend request, one variant per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerRequest {
    /// List a collection.
    CollectionDocuments {
        /// Collection to list.
        collection_id: CollectionId,
    },
    /// Load a quiz.
    Quiz {
        /// Spreadsheet holding the quiz.
        document_id: DocumentId,
    },
    /// Load a leaderboard.
    Leaderboard {
        /// Spreadsheet holding the quiz.
        document_id: DocumentId,
        /// Leaderboard worksheet.
        sheet_id: SheetId,
    },
    /// Submit a finished quiz.
    SubmitQuiz(Box<Quiz>),
    /// Load a poll.
    Poll {
        /// Spreadsheet holding the poll.
        document_id: DocumentId,
    },
    /// Read the poll status.
    PollStatus {
        /// Spreadsheet holding the poll.
        document_id: DocumentId,
        /// Internal data worksheet.
        sheet_id: SheetId,
    },
    /// Submit one poll answer.
    SubmitPollAnswer(PollResponse),
}

impl OperationRequest for BrokerRequest {
    fn operation(&self) -> Operation {
        match self {
            BrokerRequest::CollectionDocuments { .. } => Operation::FetchDocuments,
            BrokerRequest::Quiz { .. } => Operation::FetchQuiz,
            BrokerRequest::Leaderboard { .. } => Operation::FetchLeaderboard,
            BrokerRequest::SubmitQuiz(_) => Operation::SubmitQuiz,
            BrokerRequest::Poll { .. } => Operation::FetchPoll,
            BrokerRequest::PollStatus { .. } => Operation::FetchPollStatus,
            BrokerRequest::SubmitPollAnswer(_) => Operation::SubmitPollAnswer,
        }
    }
}

/// Decoded application-backend result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerResponse {
    /// Collection listing, collections first then by title.
    Documents(Vec<DocsEntry>),
    /// A quiz.
    Quiz(Quiz),
    /// Leaderboard, highest score first.
    Leaderboard(Vec<LeaderboardEntry>),
    /// A poll.
    Poll(Poll),
    /// Normalised poll status.
    PollStatus(PollStatus),
    /// A submission was accepted; the body is ignored.
    Submitted,
}

impl BrokerResponse {
    fn variant(&self) -> &'static str {
        match self {
            BrokerResponse::Documents(_) => "documents",
            BrokerResponse::Quiz(_) => "quiz",
            BrokerResponse::Leaderboard(_) => "leaderboard",
            BrokerResponse::Poll(_) => "poll",
            BrokerResponse::PollStatus(_) => "poll status",
            BrokerResponse::Submitted => "submitted",
        }
    }
}

macro_rules! into_variant {
    ($(#[$attr:meta])* $fn_name:ident, $variant:ident, $ty:ty) => {
        $(#[$attr])*
        pub fn $fn_name(self) -> Result<$ty, ErrorKind> {
            match self {
                BrokerResponse::$variant(value) => Ok(value),
                other => {
                    tracing::error!(
                        expected = stringify!($variant),
                        got = other.variant(),
                        "response variant mismatch"
                    );
                    Err(ErrorKind::Malformed)
                }
            }
        }
    };
}

impl BrokerResponse {
    into_variant!(
        /// Unwraps [`BrokerResponse::Documents`].
        into_documents, Documents, Vec<DocsEntry>
    );
    into_variant!(
        /// Unwraps [`BrokerResponse::Quiz`].
        into_quiz, Quiz, Quiz
    );
    into_variant!(
        /// Unwraps [`BrokerResponse::Leaderboard`].
        into_leaderboard, Leaderboard, Vec<LeaderboardEntry>
    );
    into_variant!(
        /// Unwraps [`BrokerResponse::Poll`].
        into_poll, Poll, Poll
    );
    into_variant!(
        /// Unwraps [`BrokerResponse::PollStatus`].
        into_poll_status, PollStatus, PollStatus
    );

    /// Checks for [`BrokerResponse::Submitted`].
    pub fn into_submitted(self) -> Result<(), ErrorKind> {
        match self {
            BrokerResponse::Submitted => Ok(()),
            other => {
                tracing::error!(
                    expected = "Submitted",
                    got = other.variant(),
                    "response variant mismatch"
                );
                Err(ErrorKind::Malformed)
            }
        }
    }
}

/// Builder/decoder for the application backend.
#[derive(Debug, Clone)]
pub struct BrokerApi {
    base_url: String,
}

impl BrokerApi {
    /// Creates an API rooted at `base_url` (e.g. `http://quiz-n-poll.appspot.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the login request that exchanges `artifact` for a session cookie.
    pub fn login_request(&self, artifact: &AuthArtifact) -> RequestSpec {
        let route = Operation::Login.route();
        RequestSpec::get(
            Operation::Login.name(),
            format!(
                "{}{}?auth={}",
                self.base_url,
                route.template,
                urlencoding::encode(artifact.expose())
            ),
        )
    }

    /// Extracts the session cookie from a login response.
    ///
    /// The first `Set-Cookie` header is used, truncated to its `name=value`
    /// pair. A response without one means the artifact was refused.
    pub fn decode_login(&self, response: &RawResponse) -> Result<Credential, ErrorKind> {
        response
            .header_values("set-cookie")
            .next()
            .and_then(|cookie| cookie.split("; ").next())
            .and_then(Credential::new)
            .ok_or(ErrorKind::Unauthorized)
    }

    fn url(&self, operation: Operation, params: &[(&str, &str)]) -> String {
        format!("{}{}", self.base_url, expand(operation.route().template, params))
    }
}

fn encode_body<T: Serialize>(operation: Operation, body: &T) -> Result<String, ErrorKind> {
    serde_json::to_string(body).map_err(|e| {
        tracing::error!(operation = operation.name(), error = %e, "could not encode request body");
        ErrorKind::Malformed
    })
}

fn decode_json<T: DeserializeOwned>(operation: Operation, body: &str) -> Result<T, ErrorKind> {
    serde_json::from_str(body).map_err(|e| malformed(operation, e))
}

impl ServiceApi for BrokerApi {
    type Request = BrokerRequest;
    type Response = BrokerResponse;

    fn service(&self) -> Service {
        Service::AppBackend
    }

    fn build(
        &self,
        request: &BrokerRequest,
        credential: &Credential,
    ) -> Result<RequestSpec, ErrorKind> {
        let operation = request.operation();
        let spec = match request {
            BrokerRequest::CollectionDocuments { collection_id } => RequestSpec::get(
                operation.name(),
                self.url(operation, &[("collection_id", collection_id.as_str())]),
            ),
            BrokerRequest::Quiz { document_id } | BrokerRequest::Poll { document_id } => {
                RequestSpec::get(
                    operation.name(),
                    self.url(operation, &[("document_id", document_id.as_str())]),
                )
            }
            BrokerRequest::Leaderboard { document_id, sheet_id }
            | BrokerRequest::PollStatus { document_id, sheet_id } => RequestSpec::get(
                operation.name(),
                self.url(
                    operation,
                    &[("document_id", document_id.as_str()), ("sheet_id", sheet_id.as_str())],
                ),
            ),
            BrokerRequest::SubmitQuiz(quiz) => RequestSpec::post(
                operation.name(),
                self.url(operation, &[]),
                encode_body(operation, quiz)?,
            ),
            BrokerRequest::SubmitPollAnswer(response) => RequestSpec::post(
                operation.name(),
                self.url(operation, &[]),
                encode_body(operation, response)?,
            ),
        };
        Ok(spec.with_header("Cookie", credential.expose()))
    }

    fn decode(
        &self,
        request: &BrokerRequest,
        response: RawResponse,
    ) -> Result<BrokerResponse, ErrorKind> {
        let operation = request.operation();
        if response.is_redirect() {
            tracing::info!(
                operation = operation.name(),
                status = response.status,
                "session cookie expired"
            );
            return Err(ErrorKind::SessionExpired);
        }
        let body = response.body.as_str();
        match operation {
            Operation::FetchDocuments => {
                let mut entries: Vec<DocsEntry> = decode_json(operation, body)?;
                entries.sort();
                Ok(BrokerResponse::Documents(entries))
            }
            Operation::FetchQuiz => decode_json(operation, body).map(BrokerResponse::Quiz),
            Operation::FetchLeaderboard => {
                let mut entries: Vec<LeaderboardEntry> = decode_json(operation, body)?;
                entries.sort_by(|a, b| b.score.cmp(&a.score));
                Ok(BrokerResponse::Leaderboard(entries))
            }
            Operation::FetchPoll => decode_json(operation, body).map(BrokerResponse::Poll),
            Operation::FetchPollStatus => {
                let WireInt(value) = decode_json(operation, body)?;
                PollStatus::from_wire(value)
                    .map(BrokerResponse::PollStatus)
                    .ok_or_else(|| malformed(operation, format!("invalid poll status {value}")))
            }
            Operation::SubmitQuiz | Operation::SubmitPollAnswer => Ok(BrokerResponse::Submitted),
            Operation::Login | Operation::FetchMyDocuments => {
                Err(malformed(operation, "not an application-backend request"))
            }
        }
    }
}
