//! Renewal budget per service.

use std::sync::atomic::{AtomicBool, Ordering};

use quizpoll::Service;

/// Records which services have used their single credential renewal.
///
/// Construct one at process start and share it with the coordinator; the
/// flags are never reset.
#[derive(Debug, Default)]
pub struct RenewalLedger {
    app_backend: AtomicBool,
    document_service: AtomicBool,
}

impl RenewalLedger {
    /// A ledger with no renewal consumed.
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, service: Service) -> &AtomicBool {
        match service {
            Service::AppBackend => &self.app_backend,
            Service::DocumentService => &self.document_service,
        }
    }

    /// Consumes the renewal for `service`. Returns `false` if it was already
    /// consumed.
    pub fn try_consume(&self, service: Service) -> bool {
        !self.flag(service).swap(true, Ordering::AcqRel)
    }

    /// Whether the renewal for `service` has been consumed.
    pub fn is_consumed(&self, service: Service) -> bool {
        self.flag(service).load(Ordering::Acquire)
    }
}
