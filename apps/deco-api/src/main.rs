use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = deco_api::Args::parse();

	deco_api::run(args).await
}
