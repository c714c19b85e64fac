//! Client configuration: TOML file plus command-line/environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::args::SettingArgs;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "quizpoll.toml";

/// Failures while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists (or was named explicitly) but could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: toml::de::Error,
    },

    /// A URL setting does not parse.
    #[error("`{field}` is not a valid URL: {value}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// `poll_interval_ms` is zero.
    #[error("`poll_interval_ms` must be greater than zero")]
    ZeroInterval,
}

/// Effective client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the quiz/poll backend.
    pub broker_url: String,
    /// Document-service feed listing the caller's quizzes.
    pub docs_feed_url: String,
    /// User agent sent with every request. The backend reads the client
    /// version from it.
    pub user_agent: String,
    /// Milliseconds between poll status fetches.
    pub poll_interval_ms: u64,
    /// Platform account to act as.
    pub account: Option<String>,
    /// Auth token exchanged for a backend session.
    pub backend_token: Option<String>,
    /// Auth token for the document service.
    pub docs_token: Option<String>,
    /// File recently opened polls are remembered in.
    pub recent_store: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker_url: "http://quiz-n-poll.appspot.com".to_string(),
            docs_feed_url: backend::DEFAULT_FEED_URL.to_string(),
            user_agent: format!("Rust/org.quizpoll/{}/1", env!("CARGO_PKG_VERSION")),
            poll_interval_ms: polling::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            account: None,
            backend_token: None,
            docs_token: None,
            recent_store: PathBuf::from("recent_polls.json"),
        }
    }
}

impl Config {
    /// Loads the configuration file, applies `overrides` and validates.
    ///
    /// Without `--config`, a missing [`DEFAULT_CONFIG_FILE`] means defaults;
    /// a file named explicitly must exist.
    pub fn load(overrides: &SettingArgs) -> Result<Self, ConfigError> {
        let mut config = match &overrides.config {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration file; absent fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(&mut self, overrides: &SettingArgs) {
        if let Some(v) = &overrides.broker_url {
            self.broker_url = v.clone();
        }
        if let Some(v) = &overrides.docs_feed_url {
            self.docs_feed_url = v.clone();
        }
        if let Some(v) = &overrides.user_agent {
            self.user_agent = v.clone();
        }
        if let Some(v) = overrides.poll_interval_ms {
            self.poll_interval_ms = v;
        }
        if let Some(v) = &overrides.account {
            self.account = Some(v.clone());
        }
        if let Some(v) = &overrides.backend_token {
            self.backend_token = Some(v.clone());
        }
        if let Some(v) = &overrides.docs_token {
            self.docs_token = Some(v.clone());
        }
        if let Some(v) = &overrides.recent_store {
            self.recent_store = v.clone();
        }
    }

    /// Checks URLs and the poll interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("broker_url", &self.broker_url),
            ("docs_feed_url", &self.docs_feed_url),
        ];
        for (field, value) in urls {
            if reqwest::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl { field, value: value.clone() });
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
        assert!(config.user_agent.starts_with("Rust/org.quizpoll/"));
    }

    #[test]
    fn file_fields_override_defaults_and_flags_override_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizpoll.toml");
        std::fs::write(
            &path,
            concat!(
                "broker_url = \"http://localhost:8080\"\n",
                "poll_interval_ms = 1000\n",
                "account = \"me@example.com\"\n",
            ),
        )
        .unwrap();

        let overrides = SettingArgs {
            config: Some(path),
            poll_interval_ms: Some(250),
            ..SettingArgs::default()
        };
        let config = Config::load(&overrides).unwrap();

        assert_eq!(config.broker_url, "http://localhost:8080");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.account.as_deref(), Some("me@example.com"));
        assert_eq!(config.docs_feed_url, backend::DEFAULT_FEED_URL);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let overrides = SettingArgs {
            config: Some(PathBuf::from("/nonexistent/quizpoll.toml")),
            ..SettingArgs::default()
        };
        assert!(matches!(Config::load(&overrides), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizpoll.toml");
        std::fs::write(&path, "brokr_url = \"http://x\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let config = Config { broker_url: "not a url".into(), ..Config::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { field: "broker_url", .. })
        ));

        let config = Config { poll_interval_ms: 0, ..Config::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));
    }
}
