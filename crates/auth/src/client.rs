//! Typed facade over both services.

use std::sync::Arc;

use async_trait::async_trait;
use backend::{BrokerApi, BrokerRequest, BrokerResponse, DocsApi, DocsRequest};
use quizpoll::{
    CollectionId, DocsEntry, DocumentId, LeaderboardEntry, Poll, PollBackend, PollResponse,
    PollStatus, Quiz, QuizPollError, SheetId,
};

use crate::AuthCoordinator;

/// One async method per operation, each routed through the
/// [`AuthCoordinator`].
///
/// Cheap to clone; clones share the coordinator and its credentials.
#[derive(Debug, Clone)]
pub struct QuizPollClient {
    auth: Arc<AuthCoordinator>,
    broker: BrokerApi,
    docs: DocsApi,
}

impl QuizPollClient {
    /// Creates a client.
    pub fn new(auth: Arc<AuthCoordinator>, broker: BrokerApi, docs: DocsApi) -> Self {
        Self { auth, broker, docs }
    }

    /// Base URL of the application backend.
    pub fn broker_url(&self) -> &str {
        self.broker.base_url()
    }

    async fn broker(&self, request: BrokerRequest) -> Result<BrokerResponse, QuizPollError> {
        self.auth.authenticated_request(&self.broker, &request).await
    }

    /// Collections and quizzes inside a collection.
    pub async fn collection_documents(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Vec<DocsEntry>, QuizPollError> {
        let request = BrokerRequest::CollectionDocuments { collection_id: collection_id.clone() };
        Ok(self.broker(request).await?.into_documents()?)
    }

    /// The caller's own quizzes, from the document service.
    pub async fn my_documents(&self) -> Result<Vec<DocsEntry>, QuizPollError> {
        let response = self
            .auth
            .authenticated_request(&self.docs, &DocsRequest::MyDocuments)
            .await?;
        Ok(response.into_documents())
    }

    /// Loads a quiz.
    pub async fn quiz(&self, document_id: &DocumentId) -> Result<Quiz, QuizPollError> {
        let request = BrokerRequest::Quiz { document_id: document_id.clone() };
        Ok(self.broker(request).await?.into_quiz()?)
    }

    /// Loads a leaderboard, highest score first.
    pub async fn leaderboard(
        &self,
        document_id: &DocumentId,
        sheet_id: &SheetId,
    ) -> Result<Vec<LeaderboardEntry>, QuizPollError> {
        let request = BrokerRequest::Leaderboard {
            document_id: document_id.clone(),
            sheet_id: sheet_id.clone(),
        };
        Ok(self.broker(request).await?.into_leaderboard()?)
    }

    /// Submits a finished quiz with its score and per-question results.
    pub async fn submit_quiz(&self, quiz: &Quiz) -> Result<(), QuizPollError> {
        let request = BrokerRequest::SubmitQuiz(Box::new(quiz.clone()));
        Ok(self.broker(request).await?.into_submitted()?)
    }

    /// Loads a poll.
    pub async fn poll(&self, document_id: &DocumentId) -> Result<Poll, QuizPollError> {
        let request = BrokerRequest::Poll { document_id: document_id.clone() };
        Ok(self.broker(request).await?.into_poll()?)
    }

    /// Reads the instructor's position in a poll.
    pub async fn poll_status(
        &self,
        document_id: &DocumentId,
        sheet_id: &SheetId,
    ) -> Result<PollStatus, QuizPollError> {
        let request = BrokerRequest::PollStatus {
            document_id: document_id.clone(),
            sheet_id: sheet_id.clone(),
        };
        Ok(self.broker(request).await?.into_poll_status()?)
    }

    /// Submits one poll answer.
    pub async fn submit_poll_answer(&self, response: &PollResponse) -> Result<(), QuizPollError> {
        let request = BrokerRequest::SubmitPollAnswer(response.clone());
        Ok(self.broker(request).await?.into_submitted()?)
    }
}

#[async_trait]
impl PollBackend for QuizPollClient {
    async fn poll_status(
        &self,
        document_id: &DocumentId,
        sheet_id: &SheetId,
    ) -> Result<PollStatus, QuizPollError> {
        QuizPollClient::poll_status(self, document_id, sheet_id).await
    }

    async fn submit_poll_answer(&self, response: &PollResponse) -> Result<(), QuizPollError> {
        QuizPollClient::submit_poll_answer(self, response).await
    }
}
