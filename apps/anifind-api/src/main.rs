use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = anifind_api::Args::parse();

	anifind_api::run(args).await
}
