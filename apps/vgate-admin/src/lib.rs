//! Operator tooling for API secrets.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use color_eyre::eyre;

use vgate_service::secret;

#[derive(Debug, Parser)]
#[command(
	version = vgate_cli::VERSION,
	rename_all = "kebab",
	styles = vgate_cli::styles(),
)]
pub struct Args {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Generate a new API secret and the hash to store for it.
	Keygen {
		#[arg(long, default_value_t = secret::DEFAULT_SECRET_LEN)]
		length: usize,
	},
	/// Hash an existing secret for storage.
	Hash {
		#[arg(value_name = "SECRET")]
		secret: String,
	},
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let output = execute(args.command)?;
	let mut stdout = io::stdout().lock();

	writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;

	Ok(())
}

pub fn execute(command: Command) -> color_eyre::Result<serde_json::Value> {
	match command {
		Command::Keygen { length } => {
			if length < 16 {
				return Err(eyre::eyre!("Secrets must be at least 16 characters."));
			}

			let generated = secret::generate_secret(length);
			let hashed = secret::hash_secret(&generated)?;

			Ok(serde_json::json!({ "secret": generated, "hashed_token": hashed }))
		},
		Command::Hash { secret: raw } => {
			if raw.is_empty() {
				return Err(eyre::eyre!("Secret must be non-empty."));
			}

			Ok(serde_json::json!({ "hashed_token": secret::hash_secret(&raw)? }))
		},
	}
}
