//! Quiz & Poll CLI entry point.
//!
//! This binary is the composition root for the whole client. Responsibilities:
//!
//! 1. **Parse arguments and configuration**: load `quizpoll.toml` (or the file
//!    given with `--config`), apply flag/environment overrides, validate.
//! 2. **Wire observability**: install a `tracing-subscriber` with an
//!    `EnvFilter` and a text or JSON layer on stderr. Every structured event
//!    emitted by the workspace crates flows through it.
//! 3. **Construct infrastructure**: the reqwest transport, the request
//!    executor, the terminal identity provider, the auth coordinator, the
//!    typed client and the recent-polls store.
//! 4. **Run the subcommand**.

mod args;
mod commands;
mod config;
mod identity;
mod logging;
mod presenter;

use std::process::ExitCode;

use clap::Parser;
use quizpoll::QuizPollError;

use crate::args::Cli;
use crate::commands::App;
use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.log_format) {
        eprintln!("failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            match err.chain().find_map(|cause| cause.downcast_ref::<QuizPollError>()) {
                Some(cause) => eprintln!("{err}: {}", cause.user_message()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.settings)?;
    tracing::debug!(
        broker_url = %config.broker_url,
        poll_interval_ms = config.poll_interval_ms,
        "configuration loaded"
    );
    App::build(config)?.run(cli.command).await
}
