//! Quiz & Poll synchronisation engine.
//!
//! While a poll screen is active, [`PollSyncEngine`] fetches the poll status
//! on a fixed interval and forwards every *change* of status to the
//! presenter. A repeated status is a no-op; a closed poll stops the loop.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Depends only on the `quizpoll` ports
//! ([`quizpoll::PollBackend`], [`quizpoll::PollPresenter`]); any backend
//! implementation can be plugged in.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`engine`] | [`PollSyncEngine`] and the task that owns the session |
//! | [`handle`] | [`PollHandle`]: stop, submit, and reclaim the session |

pub mod engine;
pub mod handle;

pub use engine::{PollSyncEngine, DEFAULT_POLL_INTERVAL};
pub use handle::{PollHandle, PollTaskError};
