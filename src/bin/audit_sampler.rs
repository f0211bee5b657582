use std::path::PathBuf;

use anyhow::Context;
use audit_sampler::{
    audit::{AuditConfig, DuplicatePiecePolicy, PathCollector},
    metainfo::WalkEvent,
    telemetry,
};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{event, Level};

/// Replays one metadata pass (newline-delimited json walk events) through the audit path
/// collector and prints the resulting per-node samples as json
#[derive(Debug, Parser)]
#[command(name = "audit-sampler")]
#[command(about = "samples audit targets per storage node from a metadata pass", long_about = None)]
struct Cli {
    #[arg(long)]
    config_path: PathBuf,
    /// File containing one json encoded walk event per line
    #[arg(long)]
    events_path: PathBuf,
    /// Overrides the seed from the config file
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the duplicate piece policy from the config file
    #[arg(long)]
    duplicate_pieces: Option<DuplicatePiecePolicy>,
    #[arg(short, long, default_value = "false")]
    tracing_jaeger: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    if args.tracing_jaeger {
        telemetry::initialize_jaeger_subscriber("http://localhost:4317/v1/traces")?;
    } else {
        telemetry::initialize_fmt_subscriber();
    }

    let result = run(&args).await;
    // pending spans are flushed even when the pass failed
    telemetry::shutdown();
    result
}

async fn run(args: &Cli) -> anyhow::Result<()> {
    let mut config = AuditConfig::from_path(&args.config_path)
        .await
        .with_context(|| format!("Unable to load config from {:?}", args.config_path))?;
    if let Some(policy) = args.duplicate_pieces {
        config.duplicate_pieces = policy;
    }

    let seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(rand::random);
    event!(Level::INFO, "starting pass with seed {} and config {:?}", seed, config);

    let mut collector = PathCollector::from_config(&config, StdRng::seed_from_u64(seed))?;

    let events = tokio::fs::File::open(&args.events_path)
        .await
        .with_context(|| format!("Unable to open {:?}", args.events_path))?;
    let mut lines = BufReader::new(events).lines();
    let mut line_number = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let Some(walk_event) = WalkEvent::from_json_line(&line)
            .with_context(|| format!("Invalid walk event at line {}", line_number))?
        else {
            continue;
        };
        walk_event.dispatch(&mut collector)?;
    }

    let summary = collector.summary();
    event!(
        Level::INFO,
        "pass finished: {} nodes, {} segment keys sampled out of {} pieces",
        summary.nodes,
        summary.sampled,
        summary.seen
    );

    println!("{}", serde_json::to_string_pretty(collector.reservoirs())?);

    Ok(())
}
