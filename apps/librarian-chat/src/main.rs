use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = librarian_chat::Args::parse();

	librarian_chat::run(args).await
}
