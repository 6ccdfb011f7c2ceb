//! Command-line entry point for the finger piano.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use finger_piano::app::{run, run_headless, Input};
use finger_piano::config::AppConfig;
use finger_piano::sink::{EventSink, JsonLinesSink, LogSink, Tee};

#[derive(Debug, Parser)]
#[command(name = "finger_piano")]
#[command(about = "Play notes by tapping fingers in front of a hand tracker")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a JSON-lines landmark recording instead of the keyboard simulator.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Process the recording without opening a window (requires --replay).
    #[arg(long, requires = "replay")]
    headless: bool,

    /// Append trigger events as JSON lines to this file
    /// (headless default: stdout).
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match try_main(Cli::parse()) {
        Ok(())  => ExitCode::SUCCESS,
        Err(e)  => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<()> {
    let cfg = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None       => AppConfig::default(),
    };

    let events_file = match &cli.events {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening event log {}", path.display()))?,
        ),
        None => None,
    };

    let open_replay = |path: &PathBuf| -> Result<BufReader<File>> {
        let f = File::open(path).with_context(|| format!("opening recording {}", path.display()))?;
        Ok(BufReader::new(f))
    };

    if cli.headless {
        let Some(path) = &cli.replay else {
            anyhow::bail!("--headless needs --replay");
        };
        let reader = open_replay(path)?;
        let mut sink: Box<dyn EventSink> = match events_file {
            Some(f) => Box::new(JsonLinesSink::new(f)),
            None    => Box::new(JsonLinesSink::new(io::stdout())),
        };
        run_headless(&cfg, reader, sink.as_mut())?;
        return Ok(());
    }

    let input = match &cli.replay {
        Some(path) => Input::Replay(Box::new(open_replay(path)?)),
        None       => Input::Simulated,
    };
    let mut sink = Tee::default().with(LogSink);
    if let Some(f) = events_file {
        sink = sink.with(JsonLinesSink::new(f));
    }
    run(&cfg, input, &mut sink)
}
