//! Port traits for the collaborators the client core depends on.
//!
//! Each trait is implemented by an infrastructure crate (or by the binary);
//! the orchestration crates depend only on these definitions.
//!
//! | Port | Implemented by |
//! |------|----------------|
//! | [`IdentityProvider`] | the binary (configured tokens + consent prompt) |
//! | [`PollBackend`] | `auth::QuizPollClient` |
//! | [`PollPresenter`] | the binary (terminal rendering) |
//! | [`RecentItemsStore`] | the `recent` crate |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    AccountName, AuthArtifact, DocumentId, PollResponse, PollStatus, Question, QuizPollError,
    Service, SheetId, Timestamp,
};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Why the identity collaborator could not supply an account or artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No platform account is configured on this device.
    #[error("no platform account available")]
    NoAccount,

    /// The person declined (or abandoned) the consent flow.
    #[error("consent was cancelled")]
    Cancelled,

    /// The platform could not be reached or returned garbage.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of platform identity.
///
/// Treated as an opaque asynchronous call: it either returns an artifact
/// (possibly after an interactive consent flow) or reports a cancellation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The account to act as. Called at most once per process.
    async fn account(&self) -> Result<AccountName, IdentityError>;

    /// Returns a platform auth artifact for `service`.
    ///
    /// When `renew` is `true` any cached artifact must be discarded and a
    /// fresh one obtained.
    async fn auth_artifact(
        &self,
        account: &AccountName,
        service: Service,
        renew: bool,
    ) -> Result<AuthArtifact, IdentityError>;
}

// ---------------------------------------------------------------------------
// Poll backend
// ---------------------------------------------------------------------------

/// The two backend calls the poll synchronisation engine needs.
#[async_trait]
pub trait PollBackend: Send + Sync {
    /// Fetches the instructor's current position, already normalised to the
    /// client's 0-based convention.
    async fn poll_status(
        &self,
        document_id: &DocumentId,
        sheet_id: &SheetId,
    ) -> Result<PollStatus, QuizPollError>;

    /// Submits one answer.
    async fn submit_poll_answer(&self, response: &PollResponse) -> Result<(), QuizPollError>;
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Receives poll state changes. Responsible for all rendering.
///
/// Every method is invoked from the single task that owns the poll session,
/// never concurrently.
pub trait PollPresenter: Send + Sync {
    /// Show the question at `index` with no answer selected.
    fn show_question(&self, index: usize, question: &Question);

    /// Show the waiting-for-instructor screen.
    fn show_waiting(&self);

    /// Show the poll-closed screen.
    fn show_closed(&self);

    /// Report a failure to the person using the client.
    fn show_error(&self, error: &QuizPollError);
}

// ---------------------------------------------------------------------------
// Recent items
// ---------------------------------------------------------------------------

/// One remembered poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItem {
    /// Spreadsheet holding the poll.
    pub document_id: DocumentId,
    /// Display title at the time of last access.
    pub title: String,
    /// When the poll was last opened.
    pub last_access: Timestamp,
}

/// Failures of a [`RecentItemsStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("recent items storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing storage holds data that cannot be parsed.
    #[error("recent items storage is corrupt: {0}")]
    Corrupt(String),
}

/// A single lookup table keyed by document id.
#[async_trait]
pub trait RecentItemsStore: Send + Sync {
    /// Inserts the document or updates its title, stamping the access time.
    async fn upsert(&self, document_id: &DocumentId, title: &str) -> Result<(), StoreError>;

    /// All remembered items, most recently accessed first.
    async fn list_all(&self) -> Result<Vec<RecentItem>, StoreError>;
}
