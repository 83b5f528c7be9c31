//! Hearth CLI - thin wrapper over the enrichment orchestrator.
//!
//! Input is a single address; output is the JSON aggregated report on
//! stdout. The process exit status reflects overall success (any one task
//! finishing counts).

use anyhow::Context;
use clap::Parser;
use hearth_browser::BrowserEngine;
use hearth_core::AppConfig;
use hearth_enrich::{standard_tasks, EngineSessionFactory, EnrichmentOrchestrator, TaskContext};
use hearth_extract::TesseractRecognizer;
use hearth_store::{RestArtifactStorage, RestRecordStore};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hearth",
    version,
    about = "Enrich a property record from web-derived sources"
)]
struct Cli {
    /// Address to enrich, quoted or as separate words
    #[arg(required = true)]
    address: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let address = cli.address.join(" ");

    // Configuration problems abort here, before any task launches.
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    config.validate().context("configuration incomplete")?;
    let config = Arc::new(config);

    let work_dir = AppConfig::data_dir()
        .unwrap_or_else(|_| std::env::temp_dir().join("hearth"))
        .join("runs");
    tokio::fs::create_dir_all(&work_dir)
        .await
        .with_context(|| format!("failed to create work dir {}", work_dir.display()))?;

    let download_dir = config
        .browser
        .download_dir
        .clone()
        .unwrap_or_else(|| work_dir.clone());

    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .context("failed to launch browser engine")?,
    );
    let store = Arc::new(RestRecordStore::new(&config.store)?);
    let artifacts = Arc::new(RestArtifactStorage::new(&config.store)?);

    let ctx = TaskContext {
        sessions: Arc::new(EngineSessionFactory::new(engine, Some(download_dir))),
        store,
        artifacts,
        recognizer: Arc::new(TesseractRecognizer::english()),
        config: config.clone(),
        work_dir,
    };

    let orchestrator = EnrichmentOrchestrator::new(standard_tasks(&ctx))
        .with_max_concurrent(config.orchestrator.max_concurrent_tasks)
        .with_sample_interval(Duration::from_millis(config.orchestrator.sample_interval_ms));

    let report = orchestrator.run_all(&address).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.overall_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
