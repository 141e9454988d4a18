//! `xplor-tags`: read and write Finder tags from the command line.
//!
//! Speaks the same contract as the desktop tag channel. `call` reads one
//! method-call JSON object from stdin and prints the reply envelope.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use xplor_lib::cli::{self, CommandOutput};
use xplor_lib::config::AppConfig;
use xplor_lib::logging;
use xplor_lib::tags::{FinderTagStore, TagAccessor};

#[derive(Parser)]
#[command(name = "xplor-tags", version, about = "Read and write the Finder tag of a file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the first Finder tag of PATH (nothing when untagged)
    Get { path: PathBuf },
    /// Replace the Finder tags of PATH with TAG; a blank TAG clears them
    Set {
        path: PathBuf,
        #[arg(allow_hyphen_values = true)]
        tag: String,
    },
    /// Answer one tag-channel method call read as JSON from stdin
    Call,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = AppConfig::load();
    logging::init_tracing(&config);
    let tags = TagAccessor::new(FinderTagStore, config.tag_mode);

    let output = match cli.command {
        Command::Get { path } => cli::get(&tags, &path),
        Command::Set { path, tag } => cli::set(&tags, &path, &tag),
        Command::Call => cli::call(&tags, std::io::stdin().lock()),
    };
    emit(&output)
}

fn emit(output: &CommandOutput) -> ExitCode {
    let _ = std::io::stdout().write_all(output.stdout.as_bytes());
    let _ = std::io::stderr().write_all(output.stderr.as_bytes());
    if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
