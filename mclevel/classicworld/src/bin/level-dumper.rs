extern crate classicworld;

use anyhow::{Context, Result};
use clap::{App, Arg};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use classicworld::{compact, legacy};

struct DumperOptions {
	source: PathBuf,
	destination: PathBuf
}

fn main() -> Result<()> {
	// Logs go to stderr so that stdout only carries the summary line
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info"))
		)
		.with_writer(std::io::stderr)
		.init();

	let matches = App::new("Classic Level Dumper")
		.version("0.1.0")
		.author("coderbot16 <coderbot16@gmail.com>")
		.about("Converts a serialized Minecraft Classic level into the compact gzip level layout")
		.arg(Arg::with_name("SOURCE")
			.help("Legacy level file to read")
			.required(true)
			.index(1)
		)
		.arg(Arg::with_name("DEST")
			.help("Compact level file to write")
			.required(true)
			.index(2)
		)
		.get_matches();

	let options = DumperOptions {
		source: matches.value_of_os("SOURCE").map(PathBuf::from).context("missing SOURCE argument")?,
		destination: matches.value_of_os("DEST").map(PathBuf::from).context("missing DEST argument")?
	};

	execute(options)
}

fn execute(options: DumperOptions) -> Result<()> {
	// Nothing is created at the destination unless the source decodes
	let level = legacy::load(&options.source)
		.with_context(|| format!("failed to read legacy level {}", options.source.display()))?;

	println!("{}", level.summary());

	compact::save(&level, &options.destination)
		.with_context(|| format!("failed to write compact level {}", options.destination.display()))
}
