//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use auth::{AuthCoordinator, QuizPollClient, RenewalLedger};
use backend::{BrokerApi, DocsApi};
use polling::PollSyncEngine;
use quizpoll::{
    CollectionId, DocsEntryKind, DocumentId, PollSession, RecentItem, RecentItemsStore, SheetId,
    SECONDS_PER_QUESTION,
};
use recent::JsonFileRecentStore;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::Instant;
use transport::{HttpTransport, RequestExecutor};

use crate::args::Command;
use crate::config::Config;
use crate::identity::{ConfiguredIdentity, StdinPrompt};
use crate::presenter::{render_question, ConsolePresenter};

/// Everything a subcommand needs, wired from the configuration.
pub struct App {
    config: Config,
    client: QuizPollClient,
    recent: Arc<dyn RecentItemsStore>,
}

impl App {
    /// Builds the client stack.
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let transport =
            HttpTransport::new(&config.user_agent).context("failed to build the HTTP client")?;
        let identity = ConfiguredIdentity::new(
            config.account.clone(),
            config.backend_token.clone(),
            config.docs_token.clone(),
            Arc::new(StdinPrompt),
        );
        let broker = BrokerApi::new(config.broker_url.clone());
        let coordinator = AuthCoordinator::new(
            Arc::new(identity),
            RequestExecutor::new(Arc::new(transport)),
            broker.clone(),
            Arc::new(RenewalLedger::new()),
        );
        let client = QuizPollClient::new(
            Arc::new(coordinator),
            broker,
            DocsApi::new(config.docs_feed_url.clone()),
        );
        let recent = Arc::new(JsonFileRecentStore::new(config.recent_store.clone()));
        Ok(Self { config, client, recent })
    }

    /// Runs one subcommand to completion.
    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Documents { collection } => self.documents(collection).await,
            Command::Quiz { document_id } => self.quiz(document_id).await,
            Command::Leaderboard { document_id, sheet_id } => {
                self.leaderboard(document_id, sheet_id).await
            }
            Command::Poll { document_id } => self.poll(document_id).await,
            Command::Recent => self.recent().await,
        }
    }

    async fn documents(&self, collection: Option<String>) -> anyhow::Result<()> {
        let entries = match collection {
            Some(id) => {
                let id = CollectionId::new(id).context("collection id must not be empty")?;
                self.client.collection_documents(&id).await
            }
            None => self.client.my_documents().await,
        }
        .context("failed to list documents")?;

        if entries.is_empty() {
            println!("No quizzes found.");
        }
        for entry in entries {
            let kind = match entry.kind {
                DocsEntryKind::Collection => "collection",
                DocsEntryKind::Quiz => "quiz",
            };
            println!("{kind:<10}  {:<44}  {}", entry.id, entry.title);
        }
        Ok(())
    }

    async fn quiz(&self, document_id: String) -> anyhow::Result<()> {
        let document_id = document_id_arg(document_id)?;
        let mut quiz = self.client.quiz(&document_id).await.context("failed to load quiz")?;
        println!("{}", quiz.display_title());
        if !quiz.description.is_empty() {
            println!("{}", quiz.description);
        }
        println!("{} questions, {SECONDS_PER_QUESTION} s each.", quiz.questions.len());

        let mut input = stdin_lines();
        let limit = Duration::from_secs(u64::from(SECONDS_PER_QUESTION));
        for index in 0..quiz.questions.len() {
            let count = quiz.questions[index].answers.len();
            print!("{}", render_question(index + 1, &quiz.questions[index]));
            let deadline = Instant::now() + limit;
            let selections = read_selections(&mut input, count, deadline).await?;
            let remaining = deadline.saturating_duration_since(Instant::now()).as_secs() as u32;

            let correct = quiz.record_answer(index, &selections, remaining)?;
            let verdict = if correct { "Correct!" } else { "Wrong." };
            println!("{verdict} Score: {}", quiz.score);
        }

        self.client.submit_quiz(&quiz).await.context("failed to submit quiz")?;
        println!("\nFinal score: {}", quiz.score);
        println!(
            "Leaderboard: quizpoll leaderboard {} {}",
            quiz.document_id, quiz.leaderboard_sheet
        );
        Ok(())
    }

    async fn leaderboard(&self, document_id: String, sheet_id: String) -> anyhow::Result<()> {
        let document_id = document_id_arg(document_id)?;
        let sheet_id = SheetId::new(sheet_id).context("sheet id must not be empty")?;
        let entries = self
            .client
            .leaderboard(&document_id, &sheet_id)
            .await
            .context("failed to load leaderboard")?;
        for (rank, entry) in entries.iter().enumerate() {
            println!("{:>3}. {:<32} {:>6}", rank + 1, entry.ldap, entry.score);
        }
        Ok(())
    }

    async fn poll(&self, document_id: String) -> anyhow::Result<()> {
        let document_id = document_id_arg(document_id)?;
        let poll = self.client.poll(&document_id).await.context("failed to load poll")?;
        let session = PollSession::new(poll);
        println!("{}", session.display_title());
        println!("Share: {}", session.share_url(self.client.broker_url()));
        remember(self.recent.as_ref(), &session).await;

        let presenter = Arc::new(ConsolePresenter::stdout());
        let engine = PollSyncEngine::new(Arc::new(self.client.clone()), presenter.clone())
            .with_interval(self.config.poll_interval());
        let handle = engine.start(session);
        tracing::info!(run_id = %handle.run_id(), "joined poll");

        let mut input = stdin_lines();
        let mut input_open = true;
        loop {
            tokio::select! {
                _ = handle.stopped() => break,
                _ = tokio::signal::ctrl_c() => {
                    handle.stop();
                    break;
                }
                line = input.next_line(), if input_open => {
                    let Some(line) = line.context("failed to read input")? else {
                        input_open = false;
                        continue;
                    };
                    let Some(count) = presenter.open_answer_count() else {
                        println!("No question is open right now.");
                        continue;
                    };
                    match parse_selections(&line, count) {
                        // Failures are already shown by the presenter.
                        Ok(selections) => {
                            let _ = handle.submit(selections).await;
                        }
                        Err(message) => println!("{message}"),
                    }
                }
            }
        }

        handle.finish().await.context("poll task failed")?;
        Ok(())
    }

    async fn recent(&self) -> anyhow::Result<()> {
        let items = self.recent.list_all().await.context("failed to read recent polls")?;
        if items.is_empty() {
            println!("No recent polls.");
        }
        for item in &items {
            println!("{}", recent_line(item));
        }
        Ok(())
    }
}

/// Records `session` as the most recently opened poll. A storage failure is
/// logged and otherwise ignored.
async fn remember(store: &dyn RecentItemsStore, session: &PollSession) {
    let title = session.display_title();
    if let Err(err) = store.upsert(session.document_id(), &title).await {
        tracing::warn!(error = %err, "could not remember poll");
    }
}

fn recent_line(item: &RecentItem) -> String {
    format!(
        "{}  {:<44}  {}",
        item.last_access.as_datetime().format("%Y-%m-%d %H:%M"),
        item.document_id,
        item.title
    )
}

fn document_id_arg(value: String) -> anyhow::Result<DocumentId> {
    DocumentId::new(value).context("document id must not be empty")
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Reads answer numbers until a valid line arrives or `deadline` passes.
/// Running out of time selects nothing.
async fn read_selections(
    input: &mut Lines<BufReader<Stdin>>,
    count: usize,
    deadline: Instant,
) -> anyhow::Result<Vec<bool>> {
    loop {
        match tokio::time::timeout_at(deadline, input.next_line()).await {
            Err(_) => {
                println!("Time is up!");
                return Ok(vec![false; count]);
            }
            Ok(line) => {
                let Some(line) = line.context("failed to read answer")? else {
                    bail!("input closed before the quiz was finished");
                };
                match parse_selections(&line, count) {
                    Ok(selections) => return Ok(selections),
                    Err(message) => println!("{message}"),
                }
            }
        }
    }
}

/// Turns `"1, 3"` into one selection per answer.
pub fn parse_selections(input: &str, count: usize) -> Result<Vec<bool>, String> {
    let mut selections = vec![false; count];
    let mut any = false;
    for part in input.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty()) {
        let number: usize = part
            .parse()
            .map_err(|_| format!("`{part}` is not an answer number"))?;
        if number == 0 || number > count {
            return Err(format!("answer numbers go from 1 to {count}"));
        }
        selections[number - 1] = true;
        any = true;
    }
    if any {
        Ok(selections)
    } else {
        Err("enter at least one answer number".to_string())
    }
}

#[cfg(test)]
mod tests {
    use quizpoll::{Poll, SheetId};
    use recent::MemoryRecentStore;

    use super::*;

    fn session(document_id: &str, title: &str) -> PollSession {
        PollSession::new(Poll {
            title: title.to_string(),
            internal_data_sheet: SheetId::new("od6").unwrap(),
            responses_sheet: SheetId::new("od7").unwrap(),
            document_id: DocumentId::new(document_id).unwrap(),
            questions: Vec::new(),
        })
    }

    #[tokio::test]
    async fn opened_polls_are_listed_most_recent_first() {
        let store = MemoryRecentStore::new();
        remember(&store, &session("doc-a", "[P] Lecture 1")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        remember(&store, &session("doc-b", "[P] Lecture 2")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        remember(&store, &session("doc-a", "[P] Lecture 1")).await;

        let lines: Vec<_> = store.list_all().await.unwrap().iter().map(recent_line).collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("doc-a"));
        assert!(lines[0].ends_with("Lecture 1"));
        assert!(!lines[0].contains("[P]"));
        assert!(lines[1].contains("doc-b"));
    }

    #[test]
    fn selections_accept_commas_and_spaces() {
        assert_eq!(parse_selections("1,3", 3), Ok(vec![true, false, true]));
        assert_eq!(parse_selections(" 2 , 1 ", 3), Ok(vec![true, true, false]));
        assert_eq!(parse_selections("2 2", 2), Ok(vec![false, true]));
    }

    #[test]
    fn selections_outside_the_answers_are_rejected() {
        assert!(parse_selections("0", 3).is_err());
        assert!(parse_selections("4", 3).is_err());
        assert!(parse_selections("a", 3).is_err());
        assert!(parse_selections("  ", 3).is_err());
    }
}
