//! Quiz & Poll authentication coordinator and client facade.
//!
//! Every authenticated request passes through [`AuthCoordinator`], which
//! attaches a cached per-service credential, performs the login handshake
//! when none is cached, and renews an expired credential at most once per
//! service for the lifetime of the [`RenewalLedger`] it was given.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Combines the identity port, the `backend` builders, and
//! the `transport` executor. Holds the only retry rule in the client.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ledger`] | [`RenewalLedger`]: one renewal per service |
//! | [`cache`] | [`CredentialCache`]: one async slot per service |
//! | [`coordinator`] | [`AuthCoordinator`] |
//! | [`client`] | [`QuizPollClient`], one method per operation |

pub mod cache;
pub mod client;
pub mod coordinator;
pub mod ledger;

pub use cache::CredentialCache;
pub use client::QuizPollClient;
pub use coordinator::AuthCoordinator;
pub use ledger::RenewalLedger;
