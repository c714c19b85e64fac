//! Core domain for the Quiz & Poll client.
//!
//! This crate contains every domain concept, newtype identifier, wire model,
//! and cross-cutting error type used by the client. Infrastructure crates
//! implement the traits defined in [`ports`]; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`DocumentId`, `SheetId`, etc.) and [`Service`] |
//! | [`types`] | Wire models (`Quiz`, `Poll`, `Question`, `Answer`, `DocsEntry`, ...) |
//! | [`poll`] | [`PollStatus`] and the mutable [`PollSession`] |
//! | [`errors`] | [`ErrorKind`] classification and the top-level [`QuizPollError`] |
//! | [`ports`] | Traits implemented by identity, backend, presentation, and storage adapters |

pub mod errors;
pub mod identifiers;
pub mod poll;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ErrorKind, QuizPollError, SessionError};
pub use identifiers::{
    AccountName, AuthArtifact, CollectionId, Credential, DocumentId, RunId, Service, SheetId,
};
pub use poll::{PollSession, PollStatus, Transition};
pub use ports::{
    IdentityError, IdentityProvider, PollBackend, PollPresenter, RecentItem, RecentItemsStore,
    StoreError,
};
pub use types::{
    strip_marker, Answer, DocsEntry, DocsEntryKind, LeaderboardEntry, Poll, PollResponse,
    Question, QuestionType, Quiz, Timestamp, WireInt, COST_OF_WRONG_ANSWER, SECONDS_PER_QUESTION,
};
