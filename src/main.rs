// src/main.rs
//
// activity-replay: feed a recorded player script through the activity
// engine and print every emitted event as one JSON line on stdout.
//
// Script format:
// {
//   "catalog": [ { "reference": {...}, "duration": 1440000 } ],
//   "steps":   [ { "after_ms": 0, "signal": "open", "item": {...} }, ... ]
// }

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use activity_engine::{
    init_activity_subsystem, replay, ActivityConfig, ActivityEvent, CatalogResolver,
    EnablementToggle, EventBus, ReplayScript,
};

#[derive(Parser)]
#[command(name = "activity-replay")]
#[command(about = "Replay a player signal script through the activity engine")]
#[command(version)]
struct Cli {
    /// Script with the catalog and the signals to replay
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Extra catalog items (JSON array), merged over the script's catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Subsystem configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()).await {
        error!("activity-replay failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;
    let script: ReplayScript = serde_json::from_str(&raw)
        .with_context(|| format!("parsing script {}", cli.script.display()))?;

    let resolver = CatalogResolver::new(script.catalog);
    if let Some(path) = &cli.catalog {
        let extra = CatalogResolver::from_json_file(path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
        for item in extra.items() {
            resolver.insert(item);
        }
    }

    let config = match &cli.config {
        Some(path) => ActivityConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ActivityConfig::default(),
    };

    let event_bus = Arc::new(EventBus::new());
    event_bus.subscribe::<ActivityEvent, _>(|event| match serde_json::to_string(event) {
        Ok(line) => println!("{}", line),
        Err(e) => error!("Failed to serialize {}: {}", event.kind, e),
    });

    let engine = init_activity_subsystem(
        Arc::new(resolver),
        Arc::new(EnablementToggle::default()),
        Arc::clone(&event_bus),
        config,
    )?;

    info!("Replaying {} steps from {}", script.steps.len(), cli.script.display());
    let results = replay(&engine, script.steps).await?;
    let applied = results.iter().filter(|applied| **applied).count();
    info!("{} of {} signals applied", applied, results.len());

    engine.dispose();
    Ok(())
}
