//! Quiz & Poll request executor.
//!
//! Runs one request/response cycle and reports exactly one outcome: the raw
//! response (for any status up to and including a temporary redirect) or an
//! [`quizpoll::ErrorKind`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, the HTTP client, and status
//! classification live here. Request construction and response decoding live
//! in the `backend` crate; retry policy lives in the `auth` crate. Nothing in
//! this crate retries.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`request`] | [`RequestSpec`], [`RawResponse`], [`Method`] |
//! | [`http`] | [`Transport`] port and the reqwest-backed [`HttpTransport`] |
//! | [`executor`] | [`RequestExecutor`] and [`classify`] |

pub mod executor;
pub mod http;
pub mod request;

pub use executor::{classify, RequestExecutor};
pub use http::{HttpTransport, Transport, TransportError};
pub use request::{Method, RawResponse, RequestSpec};
