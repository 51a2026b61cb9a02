//! Late-delivery summary report
//!
//! Loads the precomputed summary tables and prints the overall KPIs and the
//! per-dimension late rates.
//!
//! Run: ./target/release/delivery_summary --data-dir data

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use supply_chain_dashboard::features::FeatureImportanceView;
use supply_chain_dashboard::models::Dimension;
use supply_chain_dashboard::{DashboardConfig, DashboardData};

#[derive(Parser, Debug)]
#[command(name = "delivery_summary")]
#[command(about = "Print late-delivery KPIs from the precomputed summary tables")]
struct Args {
    /// TOML config file
    #[arg(long, env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the summary CSVs
    #[arg(long, env = "DASHBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let data = DashboardData::load(&config);

    println!("\n{}", "=".repeat(60));
    println!("         SUPPLY CHAIN LATE DELIVERY SUMMARY");
    println!("{}\n", "=".repeat(60));

    match data.kpis() {
        Ok(kpis) => {
            println!("Overall Delivery Metrics:");
            println!("  Total Orders:          {:>10}", kpis.total_orders);
            println!("  Total Late Deliveries: {:>10}", kpis.total_late);
            println!("  Late %:                {:>10}", kpis.late_percent_display());
            println!("  On-Time %:             {:>10}", kpis.on_time_percent_display());
        }
        Err(e) => println!("Overall Delivery Metrics unavailable: {}", e),
    }

    for dimension in Dimension::ALL {
        println!("\n{}:", dimension.heading());
        match data.table(dimension) {
            Ok(table) => {
                println!(
                    "  {:<28} {:>10} {:>10} {:>8}",
                    dimension.label_column(),
                    "Orders",
                    "Late",
                    "Late %"
                );
                println!("  {}", "-".repeat(59));
                for m in table.sorted_by_late_percent() {
                    println!(
                        "  {:<28} {:>10} {:>10} {:>7.2}%",
                        m.label, m.total_orders, m.total_late, m.late_percent
                    );
                }
            }
            Err(e) => println!("  unavailable: {}", e),
        }
    }

    println!("\nFeature Importance:");
    match &data.features {
        FeatureImportanceView::Available(features) => {
            for (i, f) in features.iter().enumerate() {
                println!("  {:>3}. {:<40} {:.4}", i + 1, f.feature, f.importance);
            }
        }
        FeatureImportanceView::Unavailable(reason) => println!("  unavailable: {}", reason),
    }

    println!("\n{}", "=".repeat(60));
    Ok(())
}
