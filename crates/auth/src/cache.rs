//! Credential slots, one per service.

use quizpoll::{Credential, Service};
use tokio::sync::{Mutex, MutexGuard};

/// Cached credentials.
///
/// Each slot is an async mutex so the coordinator can hold it across a
/// handshake; concurrent requests for the same service wait for that
/// handshake instead of starting their own.
#[derive(Debug, Default)]
pub struct CredentialCache {
    app_backend: Mutex<Option<Credential>>,
    document_service: Mutex<Option<Credential>>,
}

impl CredentialCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the slot of `service`.
    pub async fn lock(&self, service: Service) -> MutexGuard<'_, Option<Credential>> {
        match service {
            Service::AppBackend => self.app_backend.lock().await,
            Service::DocumentService => self.document_service.lock().await,
        }
    }

    /// The cached credential of `service`, if any.
    pub async fn get(&self, service: Service) -> Option<Credential> {
        self.lock(service).await.clone()
    }
}
