//! The build/decode contract shared by both services.

use quizpoll::{Credential, ErrorKind, Service};
use transport::{RawResponse, RequestSpec};

use crate::Operation;

/// A request whose operation is known without inspecting its payload.
pub trait OperationRequest {
    /// The operation this request performs.
    fn operation(&self) -> Operation;
}

/// Builds requests for one service and decodes its responses.
///
/// Both functions are pure: no I/O, no shared state. The auth coordinator
/// supplies the credential and runs the built request through the executor.
pub trait ServiceApi: Send + Sync {
    /// Typed request payload (a tagged union over the service's operations).
    type Request: OperationRequest + Send + Sync;
    /// Typed decoded result.
    type Response: Send;

    /// The service this API talks to.
    fn service(&self) -> Service;

    /// Builds the wire request, attaching `credential`.
    fn build(
        &self,
        request: &Self::Request,
        credential: &Credential,
    ) -> Result<RequestSpec, ErrorKind>;

    /// Decodes a response that the executor accepted (status ≤ 302).
    fn decode(
        &self,
        request: &Self::Request,
        response: RawResponse,
    ) -> Result<Self::Response, ErrorKind>;
}

/// Logs a decode failure and classifies it as [`ErrorKind::Malformed`].
pub(crate) fn malformed(operation: Operation, detail: impl std::fmt::Display) -> ErrorKind {
    tracing::warn!(operation = operation.name(), error = %detail, "could not decode response");
    ErrorKind::Malformed
}
