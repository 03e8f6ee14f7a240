//! awbw-replay - summarize Advance Wars By Web replay archives
//!
//! ```bash
//! # Action counts and the action type stream of two replays
//! awbw-replay 52963.zip 52964.zip
//!
//! # Also list PHP classes in the game state and locate a unit id
//! awbw-replay -v debug --types --find 190 52963.zip
//! ```
//!
//! A replay that fails to open is logged and skipped; the remaining files
//! are still processed.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use awbw_replay::php::DEFAULT_MAX_DEPTH;
use awbw_replay::{find_containers, ReplayArchive, ReplayOptions, Value};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Summarize Advance Wars By Web replay archives
#[derive(Parser)]
#[command(name = "awbw-replay")]
#[command(version)]
struct Cli {
    /// Replay archives to open
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Logging verbosity (RUST_LOG takes precedence)
    #[arg(short, long, value_enum, default_value_t = LogLevel::Warn)]
    verbose: LogLevel,

    /// Print the PHP classes found in the game state
    #[arg(long)]
    types: bool,

    /// Count game state containers holding VALUE
    #[arg(long, value_name = "VALUE")]
    find: Option<String>,

    /// Maximum nesting depth accepted by the decoder
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum decompressed size of one archive member, in bytes
    #[arg(long)]
    max_member_size: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.verbose.directive())),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut options = ReplayOptions::new().max_depth(cli.max_depth);
    options.max_member_size = cli.max_member_size;

    let mut failed = 0usize;
    for path in &cli.files {
        tracing::info!("Opening {}", path.display());
        match ReplayArchive::open_with(path, &options) {
            Ok(replay) => summarize(&replay, &cli),
            Err(e) => {
                tracing::error!("Could not open replay {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} replays could not be opened", failed, cli.files.len());
    }
    Ok(())
}

fn summarize(replay: &ReplayArchive, cli: &Cli) {
    println!("{}", replay.path().display());

    if let Some(summaries) = replay.action_summaries() {
        let kinds: Vec<&str> = summaries.collect();
        let distinct: BTreeSet<&str> = kinds.iter().copied().collect();
        println!(
            "There were {} actions. The action types were {:?}",
            kinds.len(),
            distinct
        );
        println!("{}", kinds.join(" "));
    }

    if cli.types {
        let classes: Vec<&str> = replay.type_manifest().iter().collect();
        println!("Game state classes: {}", classes.join(", "));
    }

    if let (Some(needle), Some(game)) = (&cli.find, replay.game_info()) {
        let target = needle
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(needle.clone()));
        let hits = find_containers(game, &target);
        println!("{} containers hold {:?}", hits.len(), needle);
    }
}
