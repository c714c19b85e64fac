//! Credential acquisition and the single-renewal retry rule.
//!
//! # Per-service state
//!
//! ```text
//! NO_CREDENTIAL ──handshake──▶ CREDENTIALED ──expiry──▶ (renewal) ──handshake──▶ CREDENTIALED
//!                                                   │
//!                                                   └─ renewal already used ──▶ RenewalExhausted
//! ```
//!
//! A logical request is attempted at most twice: once with the cached (or
//! freshly handshaken) credential and once after a renewal.

use std::sync::Arc;

use backend::{BrokerApi, OperationRequest, ServiceApi};
use quizpoll::{
    AccountName, Credential, ErrorKind, IdentityError, IdentityProvider, QuizPollError, Service,
};
use tokio::sync::OnceCell;
use transport::RequestExecutor;

use crate::{CredentialCache, RenewalLedger};

/// Runs requests with the right credential attached.
///
/// Share it behind an [`Arc`]; all state is internally synchronised.
pub struct AuthCoordinator {
    identity: Arc<dyn IdentityProvider>,
    executor: RequestExecutor,
    login: BrokerApi,
    ledger: Arc<RenewalLedger>,
    credentials: CredentialCache,
    account: OnceCell<AccountName>,
}

impl AuthCoordinator {
    /// Creates a coordinator.
    ///
    /// `login` performs the application-backend handshake; `ledger` is the
    /// process-wide renewal budget.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        executor: RequestExecutor,
        login: BrokerApi,
        ledger: Arc<RenewalLedger>,
    ) -> Self {
        Self {
            identity,
            executor,
            login,
            ledger,
            credentials: CredentialCache::new(),
            account: OnceCell::new(),
        }
    }

    /// The executor requests are run through.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Builds, runs, and decodes `request` against `api`'s service.
    ///
    /// An expired credential (`SessionExpired` or `Unauthorized`) triggers one
    /// renewal, if the service still has one, and one re-issue of the
    /// request. Any other failure is returned as-is.
    pub async fn authenticated_request<A: ServiceApi>(
        &self,
        api: &A,
        request: &A::Request,
    ) -> Result<A::Response, QuizPollError> {
        let service = api.service();
        let operation = request.operation();
        let mut credential = self.credential(service).await?;
        let mut renewed = false;

        loop {
            let spec = api.build(request, &credential)?;
            let outcome = match self.executor.execute(spec).await {
                Ok(raw) => api.decode(request, raw),
                Err(kind) => Err(kind),
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(kind) if kind.is_expired_credential() => {
                    if renewed {
                        tracing::warn!(
                            %service,
                            %operation,
                            error = %kind,
                            "credential rejected after renewal"
                        );
                        return Err(QuizPollError::RenewalExhausted { service });
                    }
                    tracing::info!(%service, %operation, error = %kind, "credential expired");
                    credential = self.renew(service, &credential).await?;
                    renewed = true;
                }
                Err(kind) => return Err(kind.into()),
            }
        }
    }

    /// The cached credential, or a fresh one from a handshake.
    async fn credential(&self, service: Service) -> Result<Credential, QuizPollError> {
        let mut slot = self.credentials.lock(service).await;
        if let Some(credential) = slot.as_ref() {
            return Ok(credential.clone());
        }
        let credential = self.handshake(service, false).await?;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Replaces `stale` with a renewed credential.
    ///
    /// If another request already replaced it, that credential is reused and
    /// no renewal is consumed.
    async fn renew(
        &self,
        service: Service,
        stale: &Credential,
    ) -> Result<Credential, QuizPollError> {
        let mut slot = self.credentials.lock(service).await;
        if let Some(current) = slot.as_ref().filter(|current| *current != stale) {
            tracing::debug!(%service, "credential already renewed by another request");
            return Ok(current.clone());
        }
        if !self.ledger.try_consume(service) {
            tracing::warn!(%service, "renewal already used in this process");
            return Err(QuizPollError::RenewalExhausted { service });
        }
        *slot = None;
        let credential = self.handshake(service, true).await?;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Obtains an artifact from the identity provider and, for the
    /// application backend, exchanges it through the login operation.
    async fn handshake(&self, service: Service, renew: bool) -> Result<Credential, QuizPollError> {
        tracing::info!(%service, renew, "performing handshake");
        let account = self.account(service).await?;
        let artifact = self
            .identity
            .auth_artifact(&account, service, renew)
            .await
            .map_err(|err| identity_failure(service, err))?;

        match service {
            Service::DocumentService => Ok(Credential::from(artifact)),
            Service::AppBackend => {
                let raw = self
                    .executor
                    .execute(self.login.login_request(&artifact))
                    .await
                    .map_err(|kind| handshake_failure(service, kind))?;
                self.login
                    .decode_login(&raw)
                    .map_err(|kind| handshake_failure(service, kind))
            }
        }
    }

    /// The account, resolved on first use and cached for the process.
    async fn account(&self, service: Service) -> Result<AccountName, QuizPollError> {
        self.account
            .get_or_try_init(|| self.identity.account())
            .await
            .cloned()
            .map_err(|err| identity_failure(service, err))
    }
}

impl std::fmt::Debug for AuthCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCoordinator")
            .field("ledger", &self.ledger)
            .field("account", &self.account.get())
            .finish_non_exhaustive()
    }
}

fn identity_failure(service: Service, err: IdentityError) -> QuizPollError {
    tracing::warn!(%service, error = %err, "identity provider failed");
    match err {
        IdentityError::NoAccount => QuizPollError::AccountRequired,
        IdentityError::Cancelled | IdentityError::Unavailable(_) => {
            QuizPollError::AuthenticationFailed { service }
        }
    }
}

/// Connection loss and forced upgrades keep their own meaning; everything
/// else during login is an authentication failure.
fn handshake_failure(service: Service, kind: ErrorKind) -> QuizPollError {
    tracing::warn!(%service, error = %kind, "handshake failed");
    match kind {
        ErrorKind::Connection | ErrorKind::UpgradeRequired => QuizPollError::Request(kind),
        _ => QuizPollError::AuthenticationFailed { service },
    }
}
