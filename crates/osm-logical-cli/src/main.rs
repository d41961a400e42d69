//! osm-logical CLI
//!
//! Replays captured pgoutput streams through the osm-logical output plugin
//! and checks protocol streams produced by it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use osm_logical::postgres::{FrameReader, PgOutputHost};
use osm_logical::{EmitterConfig, FlushMode, OsmLogicalPlugin, ProtocolEvent};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "osm-logical")]
#[command(version, about = "Change feed for the OSM nodes, ways and relations tables")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a length-prefixed pgoutput capture and write the protocol to stdout
    Replay {
        /// Capture file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flush policy, overrides the configuration file
        #[arg(long, value_name = "line|transaction")]
        flush: Option<FlushMode>,
    },

    /// Check a protocol stream and report what it contains
    Parse {
        /// Protocol file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Replay {
            input,
            config,
            flush,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => EmitterConfig::default(),
            };
            if let Some(mode) = flush {
                config.flush_mode = mode;
            }
            replay(open_input(input.as_deref())?, config)
        }
        Commands::Parse { input } => parse(open_input(input.as_deref())?),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(io::stderr),
        )
        .init();
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn load_config(path: &Path) -> Result<EmitterConfig> {
    let file =
        File::open(path).with_context(|| format!("Failed to open config {}", path.display()))?;
    let config: EmitterConfig = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

fn replay(input: Box<dyn Read>, config: EmitterConfig) -> Result<()> {
    info!(flush_mode = %config.flush_mode, "Replaying capture");

    let plugin = OsmLogicalPlugin::with_config(io::stdout().lock(), config);
    let metrics = plugin.metrics().clone();
    let mut host = PgOutputHost::new(plugin);

    for (index, frame) in FrameReader::new(BufReader::new(input)).enumerate() {
        let frame = frame.with_context(|| format!("Failed to read frame {}", index))?;
        host.handle_bytes(frame)
            .with_context(|| format!("Failed to handle message {}", index))?;
    }

    let messages = host.messages();
    let plugin = host.into_plugin();
    if plugin.in_transaction() {
        bail!("Capture ended inside an open transaction");
    }
    plugin.into_inner().context("Failed to flush output")?;

    let snapshot = metrics.snapshot();
    info!(
        messages,
        emitted = snapshot.emitted(),
        metrics = %serde_json::to_string(&snapshot)?,
        "Replay finished"
    );
    Ok(())
}

#[derive(Default)]
struct StreamCounts {
    transactions: u64,
    new: u64,
    redact: u64,
}

fn parse(input: Box<dyn Read>) -> Result<()> {
    let mut counts = StreamCounts::default();
    let mut open = false;

    for (index, line) in BufReader::new(input).lines().enumerate() {
        let lineno = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", lineno))?;
        let event: ProtocolEvent = line
            .parse()
            .with_context(|| format!("Line {}: {:?}", lineno, line))?;

        match event {
            ProtocolEvent::Begin if open => bail!("Line {}: BEGIN inside a transaction", lineno),
            ProtocolEvent::Begin => open = true,
            ProtocolEvent::Commit if !open => bail!("Line {}: COMMIT without BEGIN", lineno),
            ProtocolEvent::Commit => {
                open = false;
                counts.transactions += 1;
            }
            _ if !open => bail!("Line {}: {} outside a transaction", lineno, event.keyword()),
            ProtocolEvent::New { .. } => counts.new += 1,
            ProtocolEvent::Redact { .. } => counts.redact += 1,
        }
    }

    if open {
        bail!("Stream ended inside an open transaction");
    }

    println!(
        "{}",
        serde_json::json!({
            "transactions": counts.transactions,
            "new": counts.new,
            "redact": counts.redact,
        })
    );
    Ok(())
}
