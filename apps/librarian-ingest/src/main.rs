use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = librarian_ingest::Args::parse();

	librarian_ingest::run(args).await
}
