//! Control of one running poll.

use quizpoll::{PollSession, QuizPollError, RunId, SessionError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::engine::Command;

/// The poll task ended abnormally and its session is lost.
#[derive(Debug, Error)]
pub enum PollTaskError {
    /// The task panicked or was aborted.
    #[error("poll task failed: {0}")]
    Join(#[from] JoinError),
}

/// Handle returned by [`crate::PollSyncEngine::start`].
///
/// Dropping the handle stops the poll.
pub struct PollHandle {
    run_id: RunId,
    cancel: CancellationToken,
    commands: mpsc::Sender<Command>,
    task: JoinHandle<PollSession>,
    _stop_on_drop: DropGuard,
}

impl PollHandle {
    pub(crate) fn new(
        run_id: RunId,
        cancel: CancellationToken,
        commands: mpsc::Sender<Command>,
        task: JoinHandle<PollSession>,
    ) -> Self {
        Self {
            run_id,
            _stop_on_drop: cancel.clone().drop_guard(),
            cancel,
            commands,
            task,
        }
    }

    /// Identifies this activation in logs.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Stops scheduling ticks. Idempotent; a fetch already in flight is not
    /// aborted but its result is discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the loop is still running. Becomes `false` after [`stop`] or
    /// once the poll has closed.
    ///
    /// [`stop`]: PollHandle::stop
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }

    /// Resolves once the loop has been told to stop, either by [`stop`] or
    /// because the poll closed.
    ///
    /// [`stop`]: PollHandle::stop
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }

    /// Answers the open question with one selection per answer.
    ///
    /// On success the presenter is shown the waiting screen; on failure it is
    /// shown the error, which is also returned.
    pub async fn submit(&self, selections: Vec<bool>) -> Result<(), QuizPollError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Submit { selections, reply })
            .await
            .map_err(|_| QuizPollError::Session(SessionError::Stopped))?;
        outcome
            .await
            .unwrap_or(Err(QuizPollError::Session(SessionError::Stopped)))
    }

    /// Stops the loop and returns the session, ready to be started again.
    pub async fn finish(self) -> Result<PollSession, PollTaskError> {
        self.stop();
        Ok(self.task.await?)
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("run_id", &self.run_id)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
