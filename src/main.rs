//! Kakeibo main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use kakeibo_api::start_server;
use kakeibo_config::Config;
use kakeibo_core::{CoreError, Dashboard, LedgerBuilder};
use kakeibo_store::{CsvStore, StoreRef, YearMonth};
use kakeibo_utils::DefaultEventLogger;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "kakeibo")]
#[command(version = "0.1.0")]
#[command(about = "Monthly cash ledger builder and dashboard for Japan Post Bank exports", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct the daily ledger of a month and write the ledger file
    Build {
        /// Target month as YYYYMM
        #[arg(short, long)]
        month: String,
    },
    /// Serve the dashboard for a month's ledger file
    Serve {
        /// Target month as YYYYMM
        #[arg(short, long)]
        month: String,
    },
    /// Print a default configuration file
    Config,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let month = match &args.command {
        Command::Config => {
            print!("{}", Config::generate_default());
            return Ok(());
        }
        Command::Build { month } | Command::Serve { month } => month.clone(),
    };

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    log::info!("Config loaded from {}", args.config.display());

    let year_month: YearMonth = month
        .parse()
        .with_context(|| format!("invalid --month '{}'", month))?;

    let store: StoreRef = Arc::new(
        CsvStore::new(&config, DefaultEventLogger::shared("store"))
            .context("failed to set up the CSV store")?,
    );

    match args.command {
        Command::Build { .. } => {
            let builder = LedgerBuilder::new(&config, store, DefaultEventLogger::shared("ledger"));
            let ledger = builder.build(year_month).map_err(report)?;
            log::info!(
                "Ledger for {} written with {} rows",
                year_month,
                ledger.rows().len()
            );
        }
        Command::Serve { .. } => {
            let dashboard = Dashboard::load(
                &config,
                store,
                DefaultEventLogger::shared("dashboard"),
                year_month,
            )
            .map_err(report)?;
            let rt = Runtime::new()?;
            rt.block_on(start_server(config, dashboard))
                .context("dashboard server failed")?;
        }
        Command::Config => {}
    }

    Ok(())
}

/// Print suggestions before handing the error to anyhow
fn report(error: CoreError) -> anyhow::Error {
    let details = error.to_details();
    let severity = error.severity();
    for suggestion in &details.suggestions {
        eprintln!("hint: {}", suggestion);
    }
    anyhow::Error::new(error).context(format!("[{}] {}", details.code, severity))
}
