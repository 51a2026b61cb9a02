//! Supply Chain Late Delivery Dashboard server
//!
//! Usage:
//!   ./target/release/supply_chain_dashboard [options]
//!
//! Options:
//!   --port PORT        Port to listen on (default: 8501)
//!   --config PATH      TOML config with dataset locations
//!   --data-dir PATH    Directory holding the summary CSVs
//!
//! Environment variables:
//!   DASHBOARD_PORT, DASHBOARD_CONFIG, DASHBOARD_DATA_DIR - same as the options
//!   RUST_LOG - log filter (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use supply_chain_dashboard::{api, DashboardConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "supply_chain_dashboard")]
#[command(about = "Late-delivery dashboard over precomputed supply-chain metrics")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT", default_value = "8501")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// TOML config file
    #[arg(long, env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the summary CSVs (overrides the config file)
    #[arg(long, env = "DASHBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

fn print_banner(port: u16, config: &DashboardConfig) {
    println!("============================================================");
    println!("       SUPPLY CHAIN LATE DELIVERY DASHBOARD");
    println!("============================================================");
    println!();
    println!("  Dashboard: http://localhost:{}/", port);
    println!("  API:       http://localhost:{}/api/v1/", port);
    println!("  Data dir:  {}", config.data_dir.display());
    println!();
    println!("Endpoints:");
    println!("  GET  /                         Dashboard page");
    println!("  POST /upload                   Upload orders CSV");
    println!("  POST /predict                  Manual order form");
    println!("  GET  /api/v1/health            Dataset status");
    println!("  GET  /api/v1/kpis              Overall KPIs");
    println!("  GET  /api/v1/metrics/:dim      region | category | shipping");
    println!("  GET  /api/v1/features          Feature importance");
    println!("  POST /api/v1/predict           Classify one order");
    println!("  POST /api/v1/predict/batch     Classify a CSV body");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    print_banner(args.port, &config);

    let service = Arc::new(api::DashboardService::initialize(config));
    let app = api::router(service);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    tracing::info!("Starting dashboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
