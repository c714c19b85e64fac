//! Error classification and top-level error types for the client.
//!
//! [`ErrorKind`] is the uniform classification of a single request failure,
//! produced by the request executor and the response decoders. It is the value
//! the presentation collaborator turns into a user-facing message.
//!
//! [`QuizPollError`] is what every public client operation returns. It wraps
//! [`ErrorKind`] and adds the authentication outcomes that only the auth
//! coordinator can produce.
//!
//! ## Retry rules
//!
//! - Nothing below the auth coordinator retries.
//! - [`ErrorKind::is_expired_credential`] errors trigger exactly one credential
//!   renewal per service per process.
//! - Everything else is surfaced to the caller as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Service;

// ---------------------------------------------------------------------------
// Request-level classification
// ---------------------------------------------------------------------------

/// Why a single request did not produce a decodable success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The connection could not be opened or the stream broke mid-response.
    #[error("connection error")]
    Connection,

    /// An authenticated backend call was answered with a redirect: the session
    /// cookie is no longer accepted.
    #[error("session expired")]
    SessionExpired,

    /// HTTP 401.
    #[error("unauthorized (401)")]
    Unauthorized,

    /// HTTP 403. The backend has no permission to read the document.
    #[error("forbidden (403)")]
    Forbidden,

    /// HTTP 404.
    #[error("not found (404)")]
    NotFound,

    /// HTTP 415. The document is not formatted as a quiz or poll.
    #[error("unsupported document format (415)")]
    UnsupportedMediaType,

    /// HTTP 426. The backend rejected this client version.
    ///
    /// Terminal: there is no retry path, the user must upgrade out-of-band.
    #[error("client version rejected (426)")]
    UpgradeRequired,

    /// HTTP 500.
    #[error("server error (500)")]
    Server,

    /// Any other status code above the redirect range.
    #[error("unexpected HTTP status {0}")]
    Http(u16),

    /// A success response whose body or headers could not be decoded.
    #[error("malformed response")]
    Malformed,
}

impl ErrorKind {
    /// Maps a raw status code (already known to be outside the success and
    /// redirect range) to its kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            415 => ErrorKind::UnsupportedMediaType,
            426 => ErrorKind::UpgradeRequired,
            500 => ErrorKind::Server,
            other => ErrorKind::Http(other),
        }
    }

    /// Returns the HTTP status this kind was classified from, if any.
    pub fn status_code(self) -> Option<u16> {
        match self {
            ErrorKind::Connection | ErrorKind::SessionExpired | ErrorKind::Malformed => None,
            ErrorKind::Unauthorized => Some(401),
            ErrorKind::Forbidden => Some(403),
            ErrorKind::NotFound => Some(404),
            ErrorKind::UnsupportedMediaType => Some(415),
            ErrorKind::UpgradeRequired => Some(426),
            ErrorKind::Server => Some(500),
            ErrorKind::Http(code) => Some(code),
        }
    }

    /// Returns `true` if this failure means the cached credential is stale and
    /// a renewal may fix it.
    pub fn is_expired_credential(self) -> bool {
        matches!(self, ErrorKind::SessionExpired | ErrorKind::Unauthorized)
    }

    /// Message suitable for showing to the person using the client.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Connection | ErrorKind::Malformed => {
                "Connection error. Check your network and try again."
            }
            ErrorKind::SessionExpired | ErrorKind::Unauthorized => {
                "Your session has expired. Sign in again."
            }
            ErrorKind::Forbidden => {
                "The document is not shared with the Quiz & Poll service."
            }
            ErrorKind::NotFound => "The quiz or poll could not be found.",
            ErrorKind::UnsupportedMediaType => {
                "The document is not formatted as a quiz or poll."
            }
            ErrorKind::UpgradeRequired => {
                "This version of the client is no longer supported. Please upgrade."
            }
            ErrorKind::Server | ErrorKind::Http(_) => "Server error. Try again later.",
        }
    }
}

// ---------------------------------------------------------------------------
// Session-level errors
// ---------------------------------------------------------------------------

/// Errors raised by [`crate::PollSession`] when an operation does not fit its
/// current state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SessionError {
    /// An answer was submitted while no question is being shown.
    #[error("no question is currently open")]
    NoOpenQuestion,

    /// The status points past the end of the loaded question list.
    #[error("question index {index} is out of range (poll has {count} questions)")]
    QuestionOutOfRange {
        /// Zero-based index reported by the backend.
        index: usize,
        /// Number of questions in the loaded poll.
        count: usize,
    },

    /// The selection vector does not have one entry per answer.
    #[error("expected {expected} selections, got {actual}")]
    SelectionMismatch {
        /// Number of answers of the open question.
        expected: usize,
        /// Number of selections supplied.
        actual: usize,
    },

    /// The poll loop is no longer running.
    #[error("the poll is no longer active")]
    Stopped,
}

// ---------------------------------------------------------------------------
// Client-level errors
// ---------------------------------------------------------------------------

/// Errors returned by every public client operation.
///
/// Nothing here is fatal to the process; each variant is a callback outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizPollError {
    /// The request ran and failed with the given classification.
    #[error(transparent)]
    Request(#[from] ErrorKind),

    /// The handshake with the given service failed or the identity
    /// collaborator cancelled consent. Never retried automatically.
    #[error("authentication with {service} failed")]
    AuthenticationFailed {
        /// Service whose handshake failed.
        service: Service,
    },

    /// The service signalled expiry again after its single renewal for this
    /// process was already spent.
    #[error("credential for {service} expired again; renewal already used this session")]
    RenewalExhausted {
        /// Service whose renewal budget is exhausted.
        service: Service,
    },

    /// The identity collaborator has no account to act as.
    #[error("a platform account is required")]
    AccountRequired,

    /// The local poll session rejected the operation.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl QuizPollError {
    /// Returns the request classification, if this error came from a request.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            QuizPollError::Request(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Message suitable for showing to the person using the client.
    pub fn user_message(&self) -> String {
        match self {
            QuizPollError::Request(kind) => kind.user_message().to_string(),
            QuizPollError::AuthenticationFailed { .. } | QuizPollError::RenewalExhausted { .. } => {
                "Authentication failed.".to_string()
            }
            QuizPollError::AccountRequired => {
                "A platform account is required to use Quiz & Poll.".to_string()
            }
            QuizPollError::Session(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_map_to_dedicated_kinds() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(415), ErrorKind::UnsupportedMediaType);
        assert_eq!(ErrorKind::from_status(426), ErrorKind::UpgradeRequired);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Http(503));
    }

    #[test]
    fn status_code_round_trips_through_classification() {
        for code in [401, 403, 404, 415, 426, 500, 502] {
            assert_eq!(ErrorKind::from_status(code).status_code(), Some(code));
        }
        assert_eq!(ErrorKind::Connection.status_code(), None);
    }

    #[test]
    fn only_expiry_kinds_are_renewable() {
        assert!(ErrorKind::SessionExpired.is_expired_credential());
        assert!(ErrorKind::Unauthorized.is_expired_credential());
        assert!(!ErrorKind::Forbidden.is_expired_credential());
        assert!(!ErrorKind::Connection.is_expired_credential());
        assert!(!ErrorKind::UpgradeRequired.is_expired_credential());
    }

    #[test]
    fn request_errors_expose_their_kind() {
        let err = QuizPollError::from(ErrorKind::NotFound);
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert_eq!(QuizPollError::AccountRequired.kind(), None);
    }
}
