use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = notely_api::Args::parse();

	notely_api::run(args).await
}
