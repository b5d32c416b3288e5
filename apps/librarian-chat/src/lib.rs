use std::{fmt::Write as _, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use librarian_service::{AskOutcome, AskRequest, AskResponse, LibrarianService};
use librarian_storage::{corpus::CorpusStore, qdrant::QdrantStore};

const PROMPT: &str = "you> ";
const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];

#[derive(Debug, Parser)]
#[command(
	version = librarian_cli::VERSION,
	rename_all = "kebab",
	styles = librarian_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Answer a single question and exit instead of starting the prompt loop.
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub question: Option<String>,
	/// Print the retrieved candidates before each answer.
	#[arg(long)]
	pub show_candidates: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = librarian_config::load(&args.config)?;

	init_tracing(&config)?;

	let corpus = Arc::new(CorpusStore::load(&config.storage.corpus.details_path)?);
	let index = Arc::new(QdrantStore::new(&config.storage.qdrant)?);

	tracing::info!(
		corpus = corpus.len(),
		collection = %config.storage.qdrant.collection,
		"Librarian ready."
	);

	let service = LibrarianService::new(config, corpus, index)?;

	if let Some(question) = args.question {
		let response = service.ask(AskRequest { question }).await?;

		print!("{}", render(&response, args.show_candidates));

		return Ok(());
	}

	repl(&service, args.show_candidates).await
}

async fn repl(service: &LibrarianService, show_candidates: bool) -> color_eyre::Result<()> {
	let mut stdout = io::stdout();
	let mut lines = BufReader::new(io::stdin()).lines();

	stdout.write_all(b"Ask for a book recommendation. Type 'exit' to leave.\n").await?;

	loop {
		stdout.write_all(PROMPT.as_bytes()).await?;
		stdout.flush().await?;

		let Some(line) = lines.next_line().await? else {
			break;
		};
		let question = line.trim();

		if question.is_empty() {
			continue;
		}
		if is_exit_command(question) {
			break;
		}

		match service.ask(AskRequest { question: question.to_string() }).await {
			Ok(response) => {
				stdout.write_all(render(&response, show_candidates).as_bytes()).await?;
			},
			Err(err) => {
				tracing::error!(error = %err, retryable = err.is_retryable(), "Question failed.");

				stdout.write_all(format!("Sorry, that failed: {err}\n").as_bytes()).await?;
			},
		}
	}

	Ok(())
}

pub fn is_exit_command(input: &str) -> bool {
	EXIT_COMMANDS.iter().any(|command| input.trim().eq_ignore_ascii_case(command))
}

pub fn render(response: &AskResponse, show_candidates: bool) -> String {
	let mut out = String::new();

	if show_candidates && response.outcome != AskOutcome::Refused {
		out.push_str("candidates:\n");

		for (rank, candidate) in response.candidates.iter().enumerate() {
			let _ = writeln!(
				out,
				"  {}. {} (distance={:.4})",
				rank + 1,
				candidate.title,
				candidate.distance
			);
		}
	}

	let _ = writeln!(out, "librarian> {}", response.answer);

	out
}

fn init_tracing(config: &librarian_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
