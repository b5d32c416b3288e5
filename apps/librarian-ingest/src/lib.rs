use std::{fs, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use librarian_service::{LibrarianService, ReindexReport, ReindexRequest};
use librarian_storage::{corpus::CorpusStore, qdrant::QdrantStore};

#[derive(Debug, Parser)]
#[command(
	version = librarian_cli::VERSION,
	rename_all = "kebab",
	styles = librarian_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Markdown catalog to index. Defaults to `storage.corpus.catalog_path`.
	#[arg(long, value_name = "FILE")]
	pub catalog: Option<PathBuf>,
	/// Drop and recreate the collection before indexing.
	#[arg(long)]
	pub recreate: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = librarian_config::load(&args.config)?;

	init_tracing(&config)?;

	let catalog_path = args.catalog.unwrap_or_else(|| config.storage.corpus.catalog_path.clone());
	let raw = fs::read_to_string(&catalog_path).map_err(|err| {
		eyre::eyre!("Failed to read catalog at {}: {err}", catalog_path.display())
	})?;
	let entries = librarian_domain::catalog::parse_catalog(&raw);

	if entries.is_empty() {
		return Err(eyre::eyre!("No `## title:` sections found in {}.", catalog_path.display()));
	}

	tracing::info!(path = %catalog_path.display(), entries = entries.len(), "Catalog parsed.");

	let corpus = Arc::new(CorpusStore::load(&config.storage.corpus.details_path)?);
	let index = Arc::new(QdrantStore::new(&config.storage.qdrant)?);
	let service = LibrarianService::new(config, corpus, index)?;
	let report = service.reindex(ReindexRequest { entries, recreate: args.recreate }).await?;

	println!("{}", summarize(&report));

	Ok(())
}

pub fn summarize(report: &ReindexReport) -> String {
	let mut line = format!("Indexed {} entries in {} batches.", report.indexed, report.batches);

	if !report.missing_details.is_empty() {
		line.push_str(&format!(
			" {} without a detailed summary: {}.",
			report.missing_details.len(),
			report.missing_details.join(", ")
		));
	}

	line
}

fn init_tracing(config: &librarian_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	Ok(())
}
