//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`DocumentId`] with a [`SheetId`] even though both are spreadsheet keys
//! under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for secret strings.
// Same shape as string_id!, but Debug never prints the value.
// ---------------------------------------------------------------------------
macro_rules! secret_string {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Wraps a secret value, returning `None` if it is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Exposes the secret for placing on the wire.
            pub fn expose(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "(<redacted>)"))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: spreadsheet / document keys
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a spreadsheet document holding a quiz or a poll.
    DocumentId
}

string_id! {
    /// Identifies one worksheet inside a [`DocumentId`] spreadsheet
    /// (leaderboard, statistics, internal poll data, or poll responses).
    SheetId
}

string_id! {
    /// Identifies a document-service collection (folder) containing quizzes.
    CollectionId
}

string_id! {
    /// The platform account the client acts as (e.g. `"someone@example.com"`).
    ///
    /// Resolved once per process by the identity collaborator.
    AccountName
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

secret_string! {
    /// A platform-level auth artifact obtained from the identity collaborator.
    ///
    /// For the application backend it is exchanged for a [`Credential`] by the
    /// login handshake; for the document service it is used as the credential
    /// directly.
    AuthArtifact
}

secret_string! {
    /// A service-specific credential (session cookie or bearer token).
    Credential
}

impl From<AuthArtifact> for Credential {
    fn from(artifact: AuthArtifact) -> Self {
        Self(artifact.0)
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// The two identity-protected services the client talks to.
///
/// Credentials and renewal budgets are tracked independently per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// The quiz/poll JSON API (cookie session obtained via login).
    AppBackend,
    /// The document-listing service (header bearer token, Atom feeds).
    DocumentService,
}

impl Service {
    /// All services, in a stable order.
    pub const ALL: [Service; 2] = [Service::AppBackend, Service::DocumentService];

    /// The auth scope requested from the identity collaborator for this service.
    pub fn auth_scope(self) -> &'static str {
        match self {
            Service::AppBackend => "ah",
            Service::DocumentService => "writely",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::AppBackend => write!(f, "app_backend"),
            Service::DocumentService => write!(f, "document_service"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one activation of a poll synchronisation loop.
///
/// Generated fresh on every start; propagated through spans so all ticks of a
/// single activation can be correlated in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(DocumentId::new("").is_none());
        assert_eq!(DocumentId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let credential = Credential::new("ACSID=s3cret").unwrap();
        let printed = format!("{credential:?}");
        assert!(!printed.contains("s3cret"));
        assert_eq!(credential.expose(), "ACSID=s3cret");
    }

    #[test]
    fn identifiers_serialize_as_plain_strings() {
        let id = SheetId::new("od6").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"od6\"");
    }
}
