mod commands;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use tracing_subscriber::EnvFilter;

use commands::Commands;

#[derive(Parser)]
#[command(
    name = "dumpcheck",
    about = "Differential tester for Subversion dump tools",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from <path> instead of ./dumpcheck.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Candidate dumper to test
    #[arg(long, global = true)]
    candidate: Option<PathBuf>,

    /// Directory for repositories, dumps and logs
    #[arg(long, global = true)]
    work_root: Option<PathBuf>,
}

/// Route `tracing` output to stderr, filtered by `DUMPCHECK_LOG`.
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("DUMPCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(128),
            }
        }
    };

    init_logging();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("fatal: {e}");
            process::exit(128);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    commands::run(cli)
}
