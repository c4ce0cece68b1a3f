//! Quartet CLI - binary entry point.
//!
//! ```text
//! quartet [play]   interactive game on stdin/stdout (default)
//! quartet puzzle   print today's puzzle as endpoint JSON
//! ```
//!
//! Configuration comes from `~/.quartet/config.toml`; see `quartet-config`.

mod play;

use std::{
    env,
    fs::{self, OpenOptions},
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use quartet_config::{FeedSource, QuartetConfig, data_dir};
use quartet_core::CivilClock;
use quartet_engine::{GameHost, session_store};
use quartet_puzzle::{ApiFeed, FileFeed, PuzzleFeed, PuzzleSource, SheetFeed, respond};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than interleave logs with the board.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.quartet/logs/quartet.log
    if let Some(dir) = data_dir() {
        candidates.push(dir.join("logs").join("quartet.log"));
    }

    // Fallback: ./.quartet/logs/quartet.log
    candidates.push(PathBuf::from(".quartet").join("logs").join("quartet.log"));

    candidates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Puzzle,
}

impl Command {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let command = match args.next().as_deref() {
            None | Some("play") => Command::Play,
            Some("puzzle") => Command::Puzzle,
            Some(other) => bail!("unknown command {other:?}; expected `play` or `puzzle`"),
        };
        if let Some(extra) = args.next() {
            bail!("unexpected argument {extra:?}");
        }
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let command = Command::from_args(env::args().skip(1))?;

    let config = match QuartetConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Ignoring config: {e}");
            QuartetConfig::default()
        }
    };

    let offset = config.utc_offset_minutes()?;
    let clock = CivilClock::system(offset).context("civil timezone offset out of range")?;

    match config.feed()? {
        FeedSource::File(path) => run(command, FileFeed::new(path), clock, &config).await,
        FeedSource::Api(url) => {
            let feed = ApiFeed::new(url, config.timeout())?;
            run(command, feed, clock, &config).await
        }
        FeedSource::Sheet(url) => {
            let feed = SheetFeed::new(url, config.timeout())?;
            run(command, feed, clock, &config).await
        }
    }
}

async fn run<F: PuzzleFeed>(
    command: Command,
    feed: F,
    clock: CivilClock,
    config: &QuartetConfig,
) -> Result<ExitCode> {
    let source = PuzzleSource::new(feed, clock);

    match command {
        Command::Puzzle => {
            let response = respond(&source).await;
            println!("{}", serde_json::to_string_pretty(&response.body)?);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Play => {
            let host = Arc::new(GameHost::new(source, session_store(config.session_path())));
            play::run(host).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
