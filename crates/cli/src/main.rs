//! `ledger-cli` — a demo/debug binary that replays a JSON block fixture
//! through an in-memory [`Committer`], for exercising the commit pipeline
//! outside of a test harness.
//!
//! Not part of the committer core: block validation, transport and
//! configuration loading are all out of scope for this crate (as for the
//! rest of the workspace), so the fixture format is a plain JSON array of
//! already-validated [`Block`] values rather than anything a real
//! replication layer would produce.

mod replay;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ledger_core::Block;

#[derive(Parser)]
#[command(name = "ledger-cli", about = "Replay a block fixture through the committer")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Commit every block in a fixture, in order, against fresh stores.
    Commit {
        /// Path to a JSON array of blocks.
        #[arg(long)]
        blocks: PathBuf,
    },
    /// Commit a fixture against two independent fresh committers and
    /// confirm they converge on the same block-store bytes and state
    /// roots at every height (spec.md §8 invariant 7 / scenario S7).
    CheckDeterminism {
        /// Path to a JSON array of blocks.
        #[arg(long)]
        blocks: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Commit { blocks } => load_blocks(&blocks).and_then(|bs| replay::commit_all(bs)),
        Command::CheckDeterminism { blocks } => {
            load_blocks(&blocks).and_then(|bs| replay::check_determinism(bs))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_blocks(path: &PathBuf) -> Result<Vec<Block>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("reading {path:?}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("parsing {path:?}: {e}"))
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../fixtures/sample_blocks.json");

    #[test]
    fn sample_fixture_parses_and_replays() {
        let blocks: Vec<Block> = serde_json::from_str(SAMPLE).expect("fixture parses");
        assert_eq!(blocks.len(), 2);
        replay::commit_all(blocks).expect("fixture replays cleanly");
    }

    #[test]
    fn sample_fixture_is_deterministic_across_replicas() {
        let blocks: Vec<Block> = serde_json::from_str(SAMPLE).expect("fixture parses");
        replay::check_determinism(blocks).expect("fixture is deterministic");
    }
}
