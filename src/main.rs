//! Sectorfolio
//!
//! S&P 500 sector analyzer and whole-share portfolio allocator. Weights
//! sectors by inverse beta, stocks by profit-margin share, and spends a
//! fixed budget on whole shares without overspending it.

mod api;
mod models;
mod portfolio;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{NarrativeClient, UniverseClient};
use crate::models::{GroupKey, PortfolioConfig, SecurityRecord};
use crate::report::ReportGenerator;

/// Sectorfolio CLI.
#[derive(Parser)]
#[command(name = "sectorfolio")]
#[command(about = "Analyze S&P 500 sectors and build a whole-share portfolio", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Universe snapshot CSV to use instead of a live fetch
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the security universe and print a summary
    Universe {
        /// Maximum number of constituents to fetch
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Save the universe as a CSV snapshot
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Print aggregated metrics
    Metrics {
        /// Restrict to one sector
        #[arg(short, long)]
        sector: Option<String>,

        /// Grouping level (sector, industry)
        #[arg(short, long, default_value = "sector")]
        by: String,
    },

    /// Run the allocation pipeline and print the plan
    Allocate {
        /// Total cash budget in USD
        #[arg(short, long)]
        budget: f64,

        /// Maximum stocks to select per sector
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Build the full Markdown research report
    Report {
        /// Total cash budget in USD
        #[arg(short, long)]
        budget: f64,

        /// Maximum stocks to select per sector
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Report output path
        #[arg(short, long, default_value = "report.md")]
        output: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Universe { limit, save } => {
            let records = load_records(cli.input.as_ref(), limit).await?;

            println!(
                "\n{:<8} {:<24} {:<28} {:>10} {:>7} {:>8}",
                "TICKER", "SECTOR", "INDUSTRY", "PRICE", "BETA", "MARGIN"
            );
            println!("{}", "-".repeat(90));

            for record in &records {
                println!(
                    "{:<8} {:<24} {:<28} {:>10.2} {:>7} {:>8}",
                    record.ticker,
                    truncate(&record.sector, 22),
                    truncate(&record.industry, 26),
                    record.price,
                    format_opt(record.beta, 2),
                    format_opt(record.profit_margin, 3),
                );
            }

            println!("\nUniverse: {} securities", records.len());

            if let Some(path) = save {
                api::write_universe_csv(&path, &records)?;
                println!("Snapshot saved to {}", path.display());
            }
        }

        Commands::Metrics { sector, by } => {
            let records = load_records(cli.input.as_ref(), None).await?;

            let table = portfolio::aggregator::aggregate(
                &records,
                sector.as_deref(),
                GroupKey::from_str(&by),
            )?;

            println!("\n{table}");
        }

        Commands::Allocate { budget, limit } => {
            let records = load_records(cli.input.as_ref(), None).await?;

            let config = PortfolioConfig {
                budget: Decimal::try_from(budget)?,
                sector_limit: limit,
            };

            info!(budget = budget, limit = limit, "Building portfolio plan");

            let plan = portfolio::build_plan(&records, &config)?;
            println!("\n{plan}");
        }

        Commands::Report {
            budget,
            limit,
            output,
        } => {
            let records = load_records(cli.input.as_ref(), None).await?;

            let config = PortfolioConfig {
                budget: Decimal::try_from(budget)?,
                sector_limit: limit,
            };

            let plan = portfolio::build_plan(&records, &config)?;

            let narrative = NarrativeClient::from_env()?;
            let generator = ReportGenerator::new(narrative);
            generator.build_report(&records, &plan, &output).await?;

            println!("Report written to {}", output.display());
        }

        Commands::Config => {
            let config = PortfolioConfig::default();

            println!("\n=== Portfolio Configuration ===\n");
            println!("Budget:            ${}", config.budget);
            println!("Stocks per sector: {}", config.sector_limit);
        }
    }

    Ok(())
}

/// Load the universe from a snapshot when `--input` is given, live otherwise.
async fn load_records(
    input: Option<&PathBuf>,
    limit: Option<usize>,
) -> Result<Vec<SecurityRecord>> {
    let records = match input {
        Some(path) => {
            info!(path = %path.display(), "Loading universe snapshot");
            let mut records = api::read_universe_csv(path)?;
            if let Some(limit) = limit {
                records.truncate(limit);
            }
            records
        }
        None => {
            info!("Fetching live universe");
            let client = UniverseClient::new()?;
            client.fetch_universe(limit).await?
        }
    };

    info!(count = records.len(), "Universe loaded");
    Ok(records)
}

fn format_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

/// Truncate a string with ellipsis if too long.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
