//! Interactive front end for a microhal instance.
//!
//! Reads one input per line on stdin and prints one reply per line on stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use microhal_core::{Config, Microhal, Service};

/// microhal: a self-learning character-level Markov chatbot.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Instance name, also the snapshot file name.
	#[arg(long, default_value = "microhal")]
	name: String,

	/// Chain order (key width in characters) for a new instance.
	#[arg(long, default_value_t = 4)]
	order: usize,

	/// Folder holding the snapshot.
	#[arg(long, default_value = ".")]
	data_dir: PathBuf,

	/// Seconds between two snapshots.
	#[arg(long, default_value_t = 60)]
	save_interval_secs: u64,

	/// Maximum characters grown on each side of the seed keyword.
	#[arg(long, default_value_t = 80)]
	max_length: usize,

	/// PRNG seed for reproducible replies.
	#[arg(long)]
	seed: Option<u64>,

	/// Text file to learn from before chatting, one sentence per line.
	#[arg(long)]
	train: Option<PathBuf>,
}

impl Args {
	fn config(&self) -> Config {
		Config {
			name: self.name.clone(),
			order: self.order,
			max_length: self.max_length,
			save_interval: Duration::from_secs(self.save_interval_secs),
			data_dir: self.data_dir.clone(),
			seed: self.seed,
		}
	}
}

fn main() -> ExitCode {
	env_logger::init();
	let args = Args::parse();

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}: {}", args.name, e);
			eprintln!("microhal-chat: {e}");
			ExitCode::FAILURE
		}
	}
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
	// Refuse to touch any snapshot with a broken configuration
	let config = args.config();
	config.validate()?;

	let mut microhal = Microhal::load_or_create(&config.data_dir, &config.name, config.order)?;
	if let Some(ref path) = args.train {
		let lines = microhal.train_from_file(path)?;
		info!("learned {} lines from {}", lines, path.display());
	}

	let service = Service::start(microhal, &config)?;

	let stdin = io::stdin();
	let stdout = io::stdout();
	let mut stdout = stdout.lock();

	for line in stdin.lock().lines() {
		let line = line?;
		let trimmed = line.trim();

		if trimmed.is_empty() {
			continue;
		}
		if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
			break;
		}

		let reply = service.ask(trimmed)?;
		writeln!(stdout, "{}: {}", config.name, reply)?;
		stdout.flush()?;
	}

	let path = service.shutdown()?;
	info!("saved {}", path.display());
	Ok(())
}
