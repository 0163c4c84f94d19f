//! Trade Executor Binary
//!
//! Prepares a batch of trade proposals from a JSON file, prints the sized
//! batch, and executes it when `--confirm` is given.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin trade-executor -- batch.json            # dry run, batch cancelled
//! cargo run --bin trade-executor -- batch.json --confirm  # place orders
//! cargo run --bin trade-executor -- batch.json --config prod.yaml --confirm
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `KITE_API_KEY`: Kite Connect API key (via `config.yaml` interpolation)
//! - `KITE_ACCESS_TOKEN`: Session access token for this run (or `--access-token`)
//!
//! ## Optional
//! - `TRADE_EXECUTOR_CONFIG`: Config path (or `--config`, default: config.yaml)
//! - `RUST_LOG`: Log filter (default: trade_executor=info)

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use trade_executor::application::ports::SystemClock;
use trade_executor::config::{Config, ObservabilityConfig, load_config};
use trade_executor::domain::shared::CorrelationId;
use trade_executor::observability::{MetricsConfig, init_metrics};
use trade_executor::{
    BatchExecutionUseCase, ExecutionContext, InMemoryExecutionStore, KiteBrokerAdapter,
    MarketHoursGate, QuantityOverride, SessionCredential, StoreObserver,
    TradeLifecycleOrchestrator, TradeProposal,
};

/// Batch input file.
#[derive(Debug, Deserialize)]
struct BatchFile {
    /// Risk percent for this batch; the configured default when absent.
    #[serde(default)]
    risk_percent: Option<Decimal>,
    proposals: Vec<TradeProposal>,
    /// Applied at confirmation.
    #[serde(default)]
    overrides: Vec<QuantityOverride>,
}

/// Order lifecycle executor for risk-sized equity trade plans.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON batch file with proposals, optional risk percent and overrides
    batch_path: String,

    /// Place orders; without it the batch is prepared, printed and cancelled
    #[arg(long)]
    confirm: bool,

    /// Configuration file path
    #[arg(short, long, env = "TRADE_EXECUTOR_CONFIG")]
    config: Option<String>,

    /// Kite session access token for this run
    #[arg(long, env = "KITE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,
}

type ConcreteBatchUseCase =
    BatchExecutionUseCase<KiteBrokerAdapter, StoreObserver<InMemoryExecutionStore>, InMemoryExecutionStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.observability);

    if let Some(addr) = config.observability.metrics_addr.as_deref() {
        init_metrics(&MetricsConfig::from_addr_str(addr)?)?;
    }

    let batch_file = read_batch_file(&args.batch_path)?;
    config.require_api_key()?;

    let ctx = ExecutionContext::new(
        CorrelationId::generate(),
        SessionCredential::new(args.access_token),
    );
    tracing::info!(
        correlation_id = %ctx.correlation_id,
        proposals = batch_file.proposals.len(),
        confirm = args.confirm,
        "Starting trade executor"
    );

    let (use_case, observer) = build_use_case(&config)?;
    let printer = spawn_event_printer(&observer);

    let prepared = use_case
        .prepare(&ctx, batch_file.proposals, batch_file.risk_percent)
        .await?;
    println!("{}", serde_json::to_string_pretty(&prepared)?);

    if !args.confirm {
        use_case.confirm(&ctx.correlation_id, false, &[]).await?;
        tracing::info!("Dry run: pass --confirm to place orders");
        return Ok(());
    }

    use_case
        .confirm(&ctx.correlation_id, true, &batch_file.overrides)
        .await?;
    let executed = use_case.execute(&ctx).await?;
    let report = use_case.status(&ctx.correlation_id).await?;

    drop(use_case);
    drop(observer);
    let _ = printer.await;

    println!("{}", serde_json::to_string_pretty(&executed.outcomes)?);
    println!(
        "batch {} {}: {} completed, {} failed of {}",
        report.batch_id, report.overall_status, report.completed, report.failed, report.total_plans
    );
    Ok(())
}

fn build_use_case(
    config: &Config,
) -> anyhow::Result<(ConcreteBatchUseCase, Arc<StoreObserver<InMemoryExecutionStore>>)> {
    let broker = Arc::new(
        KiteBrokerAdapter::new(config.broker.to_kite_config())
            .context("creating Kite broker adapter")?,
    );
    let store = Arc::new(InMemoryExecutionStore::new());
    let observer = Arc::new(StoreObserver::new(Arc::clone(&store)));
    let gate = MarketHoursGate::new(config.market_hours.to_market_hours_config()?);

    let orchestrator = TradeLifecycleOrchestrator::new(
        Arc::clone(&broker),
        Arc::clone(&observer),
        gate,
        Arc::new(SystemClock),
        config.execution.lifecycle_settings(),
    );
    let use_case = BatchExecutionUseCase::new(broker, store, orchestrator, config.batch_settings()?);
    Ok((use_case, observer))
}

/// Print every lifecycle event as one JSON line until the observer is gone.
fn spawn_event_printer(
    observer: &StoreObserver<InMemoryExecutionStore>,
) -> tokio::task::JoinHandle<()> {
    let mut events = observer.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "Failed to encode event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn read_batch_file(path: &str) -> anyhow::Result<BatchFile> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
}

fn init_tracing(config: &ObservabilityConfig) {
    let directive = format!("trade_executor={}", config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
