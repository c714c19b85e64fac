//! Quiz & Poll backend request builders and response decoders.
//!
//! Turns a typed request into a [`transport::RequestSpec`] and a
//! [`transport::RawResponse`] back into a typed result. Two services are
//! covered: the application backend (JSON behind a session cookie) and the
//! document service (Atom feed behind a header token).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Pure functions only. Executing requests is the
//! `transport` crate's job and attaching fresh credentials is the `auth`
//! crate's job.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`operation`] | [`Operation`] and its [`Route`] table |
//! | [`api`] | [`ServiceApi`] build/decode contract |
//! | [`broker`] | [`BrokerApi`] for the application backend, including the login handshake |
//! | [`docs`] | [`DocsApi`] for the document service feed |

pub mod api;
pub mod broker;
pub mod docs;
pub mod operation;

pub use api::{OperationRequest, ServiceApi};
pub use broker::{BrokerApi, BrokerRequest, BrokerResponse};
pub use docs::{DocsApi, DocsRequest, DocsResponse, DEFAULT_FEED_URL};
pub use operation::{Operation, Route};
