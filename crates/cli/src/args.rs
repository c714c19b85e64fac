//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Quiz & Poll client.
#[derive(Parser, Debug)]
#[command(name = "quizpoll", version)]
#[command(about = "Play quizzes and answer live polls from the terminal")]
pub struct Cli {
    /// Settings that override the configuration file.
    #[command(flatten)]
    pub settings: SettingArgs,

    /// Log output format.
    #[arg(
        long,
        env = "QUIZPOLL_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Configuration overrides; each one wins over the matching file field.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingArgs {
    /// Path to the configuration file.
    #[arg(long, env = "QUIZPOLL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the quiz/poll backend.
    #[arg(long, env = "QUIZPOLL_BROKER_URL", global = true)]
    pub broker_url: Option<String>,

    /// Document feed listing your quizzes.
    #[arg(long, env = "QUIZPOLL_DOCS_FEED_URL", global = true)]
    pub docs_feed_url: Option<String>,

    /// User agent sent with every request.
    #[arg(long, env = "QUIZPOLL_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Milliseconds between poll status fetches.
    #[arg(long, env = "QUIZPOLL_POLL_INTERVAL_MS", global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Platform account to act as.
    #[arg(long, env = "QUIZPOLL_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Auth token for the quiz/poll backend login.
    #[arg(long, env = "QUIZPOLL_BACKEND_TOKEN", global = true, hide_env_values = true)]
    pub backend_token: Option<String>,

    /// Auth token for the document service.
    #[arg(long, env = "QUIZPOLL_DOCS_TOKEN", global = true, hide_env_values = true)]
    pub docs_token: Option<String>,

    /// File recently opened polls are remembered in.
    #[arg(long, env = "QUIZPOLL_RECENT_STORE", global = true)]
    pub recent_store: Option<PathBuf>,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List your quizzes, or the contents of a collection.
    Documents {
        /// Collection to list instead of your own quizzes.
        #[arg(long)]
        collection: Option<String>,
    },
    /// Play a quiz and submit the score.
    Quiz {
        /// Spreadsheet holding the quiz.
        document_id: String,
    },
    /// Show a quiz leaderboard.
    Leaderboard {
        /// Spreadsheet holding the quiz.
        document_id: String,
        /// Leaderboard worksheet.
        sheet_id: String,
    },
    /// Join a live poll.
    Poll {
        /// Spreadsheet holding the poll.
        document_id: String,
    },
    /// List recently opened polls.
    Recent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_overrides_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "quizpoll",
            "poll",
            "doc42",
            "--poll-interval-ms",
            "500",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.settings.poll_interval_ms, Some(500));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Poll { ref document_id } if document_id == "doc42"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
