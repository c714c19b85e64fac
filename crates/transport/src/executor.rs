//! Request execution and status classification.

use std::sync::Arc;
use std::time::Instant;

use quizpoll::ErrorKind;

use crate::{RawResponse, RequestSpec, Transport};

/// Highest status treated as a protocol-level success (302 Found).
const LAST_ACCEPTED_STATUS: u16 = 302;

/// Classifies a received response.
///
/// Everything up to and including a temporary redirect is handed on for
/// decoding (the decoder decides what a redirect means for its operation);
/// every other status maps to its [`ErrorKind`].
pub fn classify(response: RawResponse) -> Result<RawResponse, ErrorKind> {
    if response.status <= LAST_ACCEPTED_STATUS {
        Ok(response)
    } else {
        Err(ErrorKind::from_status(response.status))
    }
}

/// Runs requests through a [`Transport`] and classifies the outcome.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
}

impl RequestExecutor {
    /// Creates an executor over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Performs one request/response cycle.
    ///
    /// A transport failure yields [`ErrorKind::Connection`]. The request is
    /// never retried here.
    pub async fn execute(&self, request: RequestSpec) -> Result<RawResponse, ErrorKind> {
        let started = Instant::now();
        tracing::info!(
            operation = request.operation,
            method = %request.method,
            url = request.loggable_url(),
            "sending request"
        );

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    operation = request.operation,
                    error = %err,
                    "request failed before a response was received"
                );
                return Err(ErrorKind::Connection);
            }
        };

        tracing::info!(
            operation = request.operation,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received response"
        );
        tracing::trace!(operation = request.operation, body = %response.body, "response body");

        classify(response)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}
