use anyhow::{Context, Result};
use clap::Parser;
use jotledger_core::{DateRange, TransactionRecord};
use jotledger_corpus::{spawn_corpus_watcher, FsCorpus, LedgerService};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod cli;
mod settings;

use cli::{Cli, Commands, RangeArgs};

#[derive(Serialize)]
struct StatsReport<'a> {
    range: DateRange,
    net: jotledger_core::Money,
    backfilled: usize,
    #[serde(flatten)]
    stats: &'a jotledger_stats::AggregatedStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = settings::load_config(cli.config.as_deref(), cli.corpus.clone())?;
    let extensions = config.corpus.extensions.clone();
    let root = config.corpus.root.clone();

    let store = Arc::new(FsCorpus::new(extensions.clone()));
    let service = LedgerService::new(config, store).context("Invalid configuration")?;

    match cli.command {
        Commands::Records { range } => {
            let window = range.resolve(chrono::Local::now().date_naive())?;
            let records = select(&service, window, range.refresh).await;
            print_json(&records)?;
        }
        Commands::Stats { range } => {
            print_stats(&service, &range, range.refresh).await?;
        }
        Commands::Watch { range } => {
            let root = root.context("No notes folder configured; pass --corpus or set corpus.root")?;
            watch(&service, &range, root, extensions).await?;
        }
    }
    Ok(())
}

async fn select(service: &LedgerService, window: Option<DateRange>, refresh: bool) -> Vec<TransactionRecord> {
    let records = service.reload(refresh).await;
    match window {
        Some(window) => LedgerService::filter_by_date_range(&records, window),
        None => records.as_ref().clone(),
    }
}

/// Stats default to the current month, the period budgets are set for.
async fn print_stats(service: &LedgerService, range: &RangeArgs, refresh: bool) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let window = range.resolve(today)?.unwrap_or_else(|| DateRange::month_of(today));
    let records = select(service, Some(window), refresh).await;
    let stats = service.compute_stats(&records);
    if let Some(budget) = &stats.budget {
        for alert in &budget.alerts {
            tracing::warn!("{alert}");
        }
    }
    let report = StatsReport {
        range: window,
        net: stats.net(),
        backfilled: stats.backfill_count(),
        stats: &stats,
    };
    print_json(&report)
}

async fn watch(service: &LedgerService, range: &RangeArgs, root: PathBuf, extensions: Vec<String>) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    // Dropping the watcher stops the notifications.
    let _watcher = spawn_corpus_watcher(&root, extensions, tx)
        .with_context(|| format!("Failed to watch {}", root.display()))?;
    tracing::info!("Watching notes folder: {}", root.display());

    print_stats(service, range, range.refresh).await?;
    while let Some(path) = rx.recv().await {
        // One save often fires several events.
        while rx.try_recv().is_ok() {}
        tracing::info!("Change detected in {}", path.display());
        print_stats(service, range, true).await?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
