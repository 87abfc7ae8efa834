// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use price_trader::config::{AppConfig, RunMode};
use price_trader::connectors::{BinanceClient, ExecutionGateway, MarketSource, PaperGateway, ReplayMarket};
use price_trader::core::TradingEngine;
use price_trader::storage::{CsvReporter, NullReporter, ReportKind, Reporter};
use price_trader::strategies::{build_strategy, StrategyParams, StrategySpec};
use price_trader::utils::logging;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Polls a price on a fixed interval and trades it with a configurable strategy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ./Settings.*)
    #[arg(short, long)]
    config: Option<String>,

    /// Force simulated execution regardless of the configured mode
    #[arg(long)]
    dry: bool,

    /// Strategy kind, replacing the configured strategy tree
    #[arg(short, long)]
    strategy: Option<String>,

    /// Strategy arguments as "key=value key2=value2"
    #[arg(long, default_value = "")]
    strategy_args: String,

    /// Seconds between iterations
    #[arg(short, long)]
    interval: Option<u64>,

    /// Replay prices from the `price` column of a CSV file (implies --dry)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    if args.dry || args.replay.is_some() {
        config.mode = RunMode::Dry;
    }
    if let Some(kind) = &args.strategy {
        config.strategy = StrategySpec::new(kind.clone(), StrategyParams::parse_kwargs(&args.strategy_args));
    }
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    config.validate()?;

    let _log_guard = logging::init(&config.log_dir, &args.log_level)?;

    info!(
        symbol = %config.symbol,
        mode = %config.mode,
        strategy = %config.strategy.kind,
        report = %config.report,
        notification = ?config.notification.kind,
        "Starting price trader"
    );
    if config.mode == RunMode::Live {
        warn!("LIVE TRADING: orders will be sent to {}", config.exchange.base_url);
    }

    // 2. Initialize Components
    let strategy = build_strategy(&config.strategy)?;
    let mut settings = config.engine_settings();

    let client = BinanceClient::new(
        config.exchange.api_key.clone(),
        config.exchange.secret_key.clone(),
        config.exchange.base_url.clone(),
        config.order_rules(),
    );

    let market: Box<dyn MarketSource> = match &args.replay {
        Some(path) => {
            let replay = ReplayMarket::from_csv(path)
                .with_context(|| format!("failed to load replay prices from {}", path.display()))?;
            info!(prices = replay.len(), path = %path.display(), "Replaying recorded prices");
            settings.max_iterations = Some(replay.len() as u64);
            settings.interval = std::time::Duration::ZERO;
            Box::new(replay)
        }
        None => Box::new(client.clone()),
    };

    let execution_handler: Box<dyn ExecutionGateway> = match config.mode {
        RunMode::Live => Box::new(client),
        RunMode::Dry => Box::new(PaperGateway::new(config.tick_size)),
    };

    let reporter: Box<dyn Reporter> = match config.report {
        ReportKind::Csv => {
            let csv = CsvReporter::create(&config.report_dir, &config.symbol)?;
            info!(path = %csv.path().display(), "Writing iteration report");
            Box::new(csv)
        }
        ReportKind::Null => Box::new(NullReporter),
    };

    // 3. Shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, finishing current iteration");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Dropping the sender would stop the engine.
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    // 4. Run Engine
    let mut engine = TradingEngine::new(settings, strategy, market, execution_handler, reporter)
        .with_notifier(config.notification.build());
    if let Err(e) = engine.run(shutdown_rx).await {
        error!("Fatal Engine Error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
