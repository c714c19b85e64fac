//! The poll loop.
//!
//! Each started poll runs as one task that owns its [`PollSession`]. Interval
//! ticks, fetch results and submit commands all arrive through that task's
//! `select!` loop, so the session is only ever touched from one place and
//! needs no lock. Backend calls run in their own tasks and report back over a
//! channel; once the loop has stopped that channel is closed and late results
//! are dropped. A backend call that panics still reports back, as a failed
//! outcome, so the loop never waits on a result that cannot arrive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quizpoll::{
    ErrorKind, PollBackend, PollPresenter, PollResponse, PollSession, PollStatus, QuizPollError,
    RunId, Transition,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::PollHandle;

/// How often the status is fetched unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

const COMMAND_BUFFER: usize = 8;
const EVENT_BUFFER: usize = 8;

pub(crate) type Reply = oneshot::Sender<Result<(), QuizPollError>>;

/// Requests from a [`PollHandle`] to the loop.
pub(crate) enum Command {
    Submit { selections: Vec<bool>, reply: Reply },
}

/// Results of backend calls spawned by the loop.
enum Event {
    Status(Result<PollStatus, QuizPollError>),
    Submitted {
        outcome: Result<(), QuizPollError>,
        /// Status the answer was given under.
        answered: PollStatus,
        reply: Reply,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Starts poll loops.
#[derive(Clone)]
pub struct PollSyncEngine {
    backend: Arc<dyn PollBackend>,
    presenter: Arc<dyn PollPresenter>,
    interval: Duration,
}

impl PollSyncEngine {
    /// An engine polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(backend: Arc<dyn PollBackend>, presenter: Arc<dyn PollPresenter>) -> Self {
        Self {
            backend,
            presenter,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval. Zero is raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// The poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling for `session` and returns the handle that controls it.
    ///
    /// The session's status is reset to [`PollStatus::Unknown`] first, so the
    /// first fetched status always produces a transition. The first fetch is
    /// issued immediately. Must be called from within a tokio runtime.
    pub fn start(&self, mut session: PollSession) -> PollHandle {
        session.reset();
        let run_id = RunId::new_random();
        let cancel = CancellationToken::new();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);

        let span = tracing::info_span!(
            "poll",
            run_id = %run_id,
            document_id = %session.document_id()
        );
        let task = PollTask {
            session,
            backend: self.backend.clone(),
            presenter: self.presenter.clone(),
            interval: self.interval,
            cancel: cancel.clone(),
            commands: commands_rx,
        };
        let join = tokio::spawn(task.run().instrument(span));
        PollHandle::new(run_id, cancel, commands_tx, join)
    }
}

impl std::fmt::Debug for PollSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollSyncEngine")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

struct PollTask {
    session: PollSession,
    backend: Arc<dyn PollBackend>,
    presenter: Arc<dyn PollPresenter>,
    interval: Duration,
    cancel: CancellationToken,
    commands: mpsc::Receiver<Command>,
}

impl PollTask {
    async fn run(mut self) -> PollSession {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "poll started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_BUFFER);
        let mut fetch_in_flight = false;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                Some(event) = events_rx.recv() => match event {
                    Event::Status(outcome) => {
                        fetch_in_flight = false;
                        self.on_status(outcome);
                        if self.session.is_closed() {
                            self.cancel.cancel();
                            break;
                        }
                    }
                    Event::Submitted { outcome, answered, reply } => {
                        self.on_submitted(outcome, answered, reply)
                    }
                },

                Some(command) = self.commands.recv() => self.on_command(command, &events_tx),

                _ = ticker.tick() => {
                    if fetch_in_flight {
                        tracing::debug!("status fetch still in flight, tick skipped");
                        continue;
                    }
                    fetch_in_flight = true;
                    self.spawn_fetch(&events_tx);
                }
            }
        }

        tracing::info!(status = %self.session.current(), "poll stopped");
        self.session
    }

    fn spawn_fetch(&self, events: &mpsc::Sender<Event>) {
        let backend = self.backend.clone();
        let document_id = self.session.document_id().clone();
        let sheet_id = self.session.status_sheet().clone();
        let events = events.clone();
        tokio::spawn(
            async move {
                let outcome =
                    isolated(async move { backend.poll_status(&document_id, &sheet_id).await })
                        .await;
                if events.send(Event::Status(outcome)).await.is_err() {
                    tracing::debug!("poll stopped, late status discarded");
                }
            }
            .in_current_span(),
        );
    }

    fn on_status(&mut self, outcome: Result<PollStatus, QuizPollError>) {
        let status = match outcome {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "status fetch failed, tick skipped");
                self.presenter.show_error(&err);
                return;
            }
        };
        match self.session.apply_status(status) {
            Ok(None) => tracing::debug!(%status, "status unchanged"),
            Ok(Some(transition)) => {
                tracing::info!(%status, "status changed");
                self.dispatch(transition);
            }
            Err(err) => {
                tracing::warn!(%status, error = %err, "status rejected");
                self.presenter.show_error(&QuizPollError::Session(err));
            }
        }
    }

    fn dispatch(&self, transition: Transition) {
        match transition {
            Transition::ShowQuestion(index) => {
                if let Some(question) = self.session.questions().get(index) {
                    self.presenter.show_question(index, question);
                }
            }
            Transition::ShowWaiting => self.presenter.show_waiting(),
            Transition::ShowClosed => self.presenter.show_closed(),
        }
    }

    fn on_command(&mut self, command: Command, events: &mpsc::Sender<Event>) {
        match command {
            Command::Submit { selections, reply } => match self.session.answer(&selections) {
                Ok(response) => {
                    let answered = self.session.current();
                    self.spawn_submit(response, answered, reply, events)
                }
                Err(err) => {
                    let err = QuizPollError::Session(err);
                    tracing::warn!(error = %err, "answer rejected");
                    self.presenter.show_error(&err);
                    let _ = reply.send(Err(err));
                }
            },
        }
    }

    fn spawn_submit(
        &self,
        response: PollResponse,
        answered: PollStatus,
        reply: Reply,
        events: &mpsc::Sender<Event>,
    ) {
        tracing::info!(
            question_number = response.question_number,
            success = response.success,
            "submitting answer"
        );
        let backend = self.backend.clone();
        let events = events.clone();
        tokio::spawn(
            async move {
                let outcome =
                    isolated(async move { backend.submit_poll_answer(&response).await }).await;
                // The reply is dropped with the event if the loop has stopped.
                let _ = events
                    .send(Event::Submitted { outcome, answered, reply })
                    .await;
            }
            .in_current_span(),
        );
    }

    fn on_submitted(
        &self,
        outcome: Result<(), QuizPollError>,
        answered: PollStatus,
        reply: Reply,
    ) {
        match &outcome {
            Ok(()) if self.session.current() == answered => self.presenter.show_waiting(),
            Ok(()) => tracing::debug!(
                %answered,
                status = %self.session.current(),
                "answer accepted after the poll moved on"
            ),
            Err(err) => {
                tracing::warn!(error = %err, "answer submission failed");
                self.presenter.show_error(err);
            }
        }
        let _ = reply.send(outcome);
    }
}

/// Runs a backend call in its own task so a panic inside it becomes a failed
/// outcome instead of a lost one.
async fn isolated<T, F>(call: F) -> Result<T, QuizPollError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, QuizPollError>> + Send + 'static,
{
    match tokio::spawn(call.in_current_span()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "backend call did not complete");
            Err(QuizPollError::Request(ErrorKind::Malformed))
        }
    }
}
