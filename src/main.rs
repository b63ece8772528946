//! Anomaly detection server entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fin_anomaly_guard::anomaly_detection::{DetectionService, DetectorKind, TransactionRecord};
use fin_anomaly_guard::api::ApiServer;
use fin_anomaly_guard::config::AppConfig;

#[derive(Parser)]
#[command(name = "anomaly_guard")]
#[command(about = "Transaction anomaly detection service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Server {
        /// Port to bind to (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Evaluate a single transaction and print the JSON verdict
    Detect(DetectArgs),
}

#[derive(ClapArgs)]
struct DetectArgs {
    #[arg(long, default_value = "cli-user")]
    user: String,
    #[arg(long)]
    amount: f64,
    #[arg(long)]
    merchant: String,
    /// ISO-8601 timestamp; may be omitted
    #[arg(long, default_value = "")]
    timestamp: String,
    #[arg(long)]
    international: bool,
    /// Which strategy to run
    #[arg(long, value_enum, default_value_t = Strategy::Rule)]
    strategy: Strategy,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Rule,
    Ml,
    Demo,
}

impl From<Strategy> for DetectorKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Rule => DetectorKind::RuleBased,
            Strategy::Ml => DetectorKind::Statistical,
            Strategy::Demo => DetectorKind::Demo,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = AppConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("failed to load config: {e}. Using defaults");
        AppConfig::default()
    });

    match args.command {
        Some(Commands::Detect(detect)) => run_detect(&config, detect),
        Some(Commands::Server { port }) => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await
        }
        None => run_server(config).await,
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    info!(
        "Starting anomaly detection server v{}",
        env!("CARGO_PKG_VERSION")
    );
    ApiServer::new(config).run().await
}

fn run_detect(config: &AppConfig, detect: DetectArgs) -> Result<()> {
    let service = DetectionService::new(config.detection.model_path.clone());
    let tx = TransactionRecord {
        user_id: detect.user,
        amount: detect.amount,
        timestamp: detect.timestamp,
        merchant: detect.merchant,
        merchant_category: String::new(),
        is_international: detect.international,
        currency: "INR".to_string(),
        meta: Default::default(),
    };

    let result = service.evaluate(detect.strategy.into(), &tx)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
