use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vgate_api::Args::parse();

	vgate_api::run(args).await
}
