//! StockFlow CLI and pipeline binary
//!
//! Entry point for the StockFlow application. Provides commands for
//! initializing and validating configuration, starting the pipeline,
//! and running a self-contained demo flow.

use analysis::{AnalysisOrchestrator, AnalysisStatusService, CorrelatedAnalysisConsumer};
use anyhow::{Context, Result};
use bus::{InMemoryBus, MessageBus};
use cache::{InMemoryCache, ResultCache};
use chrono::{Duration as ChronoDuration, Utc};
use cli::{Cli, Commands};
use common::{AnalysisType, PricePoint, Symbol};
use config::{
    generate_default_config, load_config, save_config, validate_config, StockFlowConfig,
};
use market_data::{InMemoryPriceStore, MarketDataService, PriceStore};
use observability::{init_logging, init_metrics, LogFormat};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start { config } => start_pipeline(config).await,
        Commands::Validate { config } => {
            init_logging("stockflow", LogFormat::Pretty)?;
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_logging("stockflow", LogFormat::Pretty)?;
            init_command(output).await
        }
        Commands::Demo {
            config,
            symbol,
            period,
        } => demo_command(config, symbol, period).await,
    }
}

fn load_and_check<P: AsRef<Path>>(config_path: P) -> Result<StockFlowConfig> {
    let config = load_config(config_path)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start due to configuration errors");
    }
    Ok(config)
}

fn init_observability(config: &StockFlowConfig) -> Result<()> {
    // RUST_LOG takes precedence over the configured level
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.logging.level);
    }
    let format: LogFormat = config
        .logging
        .format
        .parse()
        .map_err(anyhow::Error::msg)?;
    init_logging(&config.service.name, format)?;

    if config.metrics.enabled {
        init_metrics(config.metrics.port)?;
    }
    Ok(())
}

/// All pipeline services wired over one in-process bus
struct Pipeline {
    store: Arc<InMemoryPriceStore>,
    status: Arc<AnalysisStatusService>,
    orchestrator: AnalysisOrchestrator,
}

async fn wire_pipeline(config: &StockFlowConfig) -> Pipeline {
    let bus: Arc<InMemoryBus> = Arc::new(InMemoryBus::new());
    let cache = Arc::new(InMemoryCache::new());
    let status = Arc::new(AnalysisStatusService::with_ttls(
        cache as Arc<dyn ResultCache>,
        config.cache.processing_ttl(),
        config.cache.result_ttl(),
    ));

    let store = Arc::new(InMemoryPriceStore::new());
    let market = Arc::new(MarketDataService::new(
        store.clone() as Arc<dyn PriceStore>,
        bus.clone() as Arc<dyn MessageBus>,
    ));
    tokio::spawn(market.run());

    if config.analysis.sma.enabled {
        let consumer = Arc::new(CorrelatedAnalysisConsumer::with_timeout(
            bus.clone() as Arc<dyn MessageBus>,
            status.clone(),
            config.correlator.fetch_timeout(),
        ));
        tokio::spawn(consumer.run());
    } else {
        warn!("SMA analysis disabled; analysis requests will not be served");
    }

    let orchestrator =
        AnalysisOrchestrator::new(bus as Arc<dyn MessageBus>, status.clone());

    // let subscriptions land before anything publishes
    tokio::task::yield_now().await;

    Pipeline {
        store,
        status,
        orchestrator,
    }
}

async fn start_pipeline<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = load_and_check(config_path)?;
    init_observability(&config)?;

    info!(
        service = %config.service.name,
        version = %config.service.version,
        "Starting pipeline"
    );
    let _pipeline = wire_pipeline(&config).await;

    info!("Pipeline running; press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received, stopping");
    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {}", config.service.name);
    println!("Version: {}", config.service.version);
    println!(
        "Fetch timeout: {}s",
        config.correlator.fetch_timeout_seconds
    );
    println!(
        "Cache TTLs: processing={}s, result={}s",
        config.cache.processing_ttl_seconds, config.cache.result_ttl_seconds
    );

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!(
        "  1. Run 'stockflow validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  2. Run 'stockflow start --config {:?}' to start the pipeline",
        output_path
    );

    Ok(())
}

async fn demo_command<P: AsRef<Path>>(
    config_path: P,
    symbol: String,
    period: usize,
) -> Result<()> {
    let config = if config_path.as_ref().exists() {
        load_and_check(&config_path)?
    } else {
        generate_default_config()
    };
    init_observability(&config)?;

    let pipeline = wire_pipeline(&config).await;
    let symbol = Symbol::new(symbol);

    // two months of synthetic daily closes ending today
    let today = Utc::now().date_naive();
    let points: Vec<PricePoint> = (0..60)
        .rev()
        .map(|back| {
            let close = 100.0 + (60 - back) as f64 * 0.5;
            PricePoint {
                date: today - ChronoDuration::days(back),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10_000.0,
            }
        })
        .collect();
    pipeline
        .store
        .insert(symbol.clone(), points)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let mut parameters = HashMap::new();
    parameters.insert(
        "startDate".to_string(),
        (today - ChronoDuration::days(10)).to_string(),
    );
    parameters.insert("endDate".to_string(), today.to_string());
    parameters.insert("period".to_string(), period.to_string());

    let id = pipeline
        .orchestrator
        .trigger_analysis(symbol.clone(), AnalysisType::Sma, parameters)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    println!("Triggered SMA({}) for {} -> {}", period, symbol, id);

    // poll until the request reaches a terminal status
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("Demo timed out waiting for a terminal status");
        }
        match pipeline
            .status
            .get_status(id)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
        {
            Some(status) if status.is_terminal() => {
                println!("Status: {}", status);
                break;
            }
            _ => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }

    match pipeline
        .status
        .get_result(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
    {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        None => {
            println!("No result available (request failed or expired)");
        }
    }

    Ok(())
}
