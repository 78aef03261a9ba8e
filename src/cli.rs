use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::batch::run_batch;
use crate::convert::SofficeConvert;
use crate::load_config::load_config;
use crate::remote::RcloneRemote;
use crate::scheduler::{run_loop, IntervalTicker};

/// CLI for docmerge: render and publish one document per spreadsheet row.
#[derive(Parser)]
#[clap(
    name = "docmerge",
    version,
    about = "Render spreadsheet rows into templated documents and publish them to cloud storage"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the scheduler loop (the default): one batch now, then one per interval
    Run,
    /// Run a single batch and exit
    Once,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;
    config.trace_loaded();

    let remote = RcloneRemote::new(&config.tools.rclone_bin);
    let converter = SofficeConvert::new(&config.tools.soffice_bin);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Once => {
            let report = run_batch(&config, &remote, &converter).await?;
            println!("Batch complete.\nReport:");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Run => {
            info!(
                interval_minutes = config.schedule.interval_minutes,
                "Starting scheduler"
            );
            let mut ticker = IntervalTicker::new(config.schedule.interval());
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            let stats = run_loop(&config, &remote, &converter, &mut ticker, shutdown).await;
            println!(
                "Scheduler stopped after {} batch(es), {} aborted.",
                stats.batches, stats.failures
            );
        }
    }

    Ok(())
}
