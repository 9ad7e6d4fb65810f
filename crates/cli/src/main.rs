use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subfetch_core::{
    load_config, validate_config, AcquisitionOrchestrator, HttpMediaManager,
    HttpSubtitleProvider, MediaManager, OrchestratorConfig, SanitizedConfig, SubtitleProvider,
    Tracker,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SUBFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    // Create collaborators
    let manager: Arc<dyn MediaManager> = Arc::new(
        HttpMediaManager::new(config.manager.clone())
            .context("Failed to create media manager client")?,
    );
    let provider: Arc<dyn SubtitleProvider> = Arc::new(
        HttpSubtitleProvider::new(config.provider.clone())
            .context("Failed to create subtitle provider client")?,
    );

    // Load tracker state
    let tracker = Tracker::load(&config.tracking.path);
    info!(
        entries = tracker.len(),
        path = %tracker.path().display(),
        "Tracker loaded"
    );

    // Run one acquisition pass
    let orchestrator_config = OrchestratorConfig::from_config(&config);
    let mut orchestrator =
        AcquisitionOrchestrator::new(orchestrator_config, manager, provider, tracker);

    let summary = orchestrator
        .run()
        .await
        .context("Acquisition run aborted")?;

    info!(
        items = summary.items_processed,
        languages = summary.languages_considered,
        acquired = summary.acquired,
        skipped = summary.skipped,
        not_found = summary.not_found,
        failed = summary.failed,
        "Run finished"
    );

    Ok(())
}
