//! Identity for a terminal session: configured tokens plus a consent prompt.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use quizpoll::{AccountName, AuthArtifact, IdentityError, IdentityProvider, Service};
use tokio::sync::Mutex;

/// Asks the person at the terminal for a token.
#[async_trait]
pub trait TokenPrompt: Send + Sync {
    /// Returns the entered token; an empty string means the person declined.
    async fn ask(&self, account: &AccountName, service: Service) -> std::io::Result<String>;
}

/// Prompts on stderr and reads one line from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

#[async_trait]
impl TokenPrompt for StdinPrompt {
    async fn ask(&self, account: &AccountName, service: Service) -> std::io::Result<String> {
        let question = format!(
            "Allow Quiz & Poll to access {service} as {account}? \
             Paste a token for scope `{}` (empty to cancel): ",
            service.auth_scope()
        );
        tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            stderr.write_all(question.as_bytes())?;
            stderr.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line.trim().to_string())
        })
        .await
        .map_err(std::io::Error::other)?
    }
}

/// [`IdentityProvider`] backed by configured tokens.
///
/// A token that is missing, or that was discarded by a renewal, is asked for
/// through the [`TokenPrompt`].
pub struct ConfiguredIdentity {
    account: Option<AccountName>,
    tokens: Mutex<HashMap<Service, AuthArtifact>>,
    prompt: Arc<dyn TokenPrompt>,
}

impl ConfiguredIdentity {
    /// Creates the provider. Empty strings count as absent.
    pub fn new(
        account: Option<String>,
        backend_token: Option<String>,
        docs_token: Option<String>,
        prompt: Arc<dyn TokenPrompt>,
    ) -> Self {
        let mut tokens = HashMap::new();
        if let Some(token) = backend_token.and_then(AuthArtifact::new) {
            tokens.insert(Service::AppBackend, token);
        }
        if let Some(token) = docs_token.and_then(AuthArtifact::new) {
            tokens.insert(Service::DocumentService, token);
        }
        Self {
            account: account.and_then(AccountName::new),
            tokens: Mutex::new(tokens),
            prompt,
        }
    }
}

impl std::fmt::Debug for ConfiguredIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredIdentity")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityProvider for ConfiguredIdentity {
    async fn account(&self) -> Result<AccountName, IdentityError> {
        self.account.clone().ok_or(IdentityError::NoAccount)
    }

    async fn auth_artifact(
        &self,
        account: &AccountName,
        service: Service,
        renew: bool,
    ) -> Result<AuthArtifact, IdentityError> {
        let mut tokens = self.tokens.lock().await;
        if renew {
            tokens.remove(&service);
        } else if let Some(token) = tokens.get(&service) {
            return Ok(token.clone());
        }

        let answer = self
            .prompt
            .ask(account, service)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        let token = AuthArtifact::new(answer).ok_or(IdentityError::Cancelled)?;
        tokens.insert(service, token.clone());
        Ok(token)
    }
}
