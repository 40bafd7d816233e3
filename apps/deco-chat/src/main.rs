use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = deco_chat::Args::parse();

	deco_chat::run(args).await
}
