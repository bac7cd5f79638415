use clap::Parser;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vgate_admin::Args::parse();

	vgate_admin::run(args)
}
