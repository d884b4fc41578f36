use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use jotledger_core::DateRange;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jotledger",
    version,
    about = "Transactions and budgets from the daily notes you already keep",
    long_about = "jotledger scans a folder of daily notes for lines such as \
                  `#cy 30 lunch`, turns them into dated transactions, and \
                  reports totals, per-category breakdowns and budget alerts."
)]
pub struct Cli {
    /// Config file (defaults to the platform config folder)
    #[arg(long, global = true, env = "JOTLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Notes folder, overriding `corpus.root` from the config
    #[arg(long, global = true, env = "JOTLEDGER_CORPUS")]
    pub corpus: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List transactions, newest first
    Records {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Totals, category breakdown and budget status
    Stats {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Reprint stats whenever a note changes
    Watch {
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Whole calendar month (YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to", "year", "last"])]
    pub month: Option<String>,
    /// Whole calendar year
    #[arg(long, conflicts_with_all = ["from", "to", "last"])]
    pub year: Option<i32>,
    /// The last N days, today included
    #[arg(long, value_name = "N", conflicts_with_all = ["from", "to"])]
    pub last: Option<u32>,
    /// Ignore cached records and rescan the notes
    #[arg(long)]
    pub refresh: bool,
}

impl RangeArgs {
    /// The requested window, or `None` for every record. An open end is
    /// bounded by `today`; an open start is unbounded.
    pub fn resolve(&self, today: NaiveDate) -> Result<Option<DateRange>> {
        if let Some(label) = &self.month {
            return match DateRange::parse_month(label) {
                Some(range) => Ok(Some(range)),
                None => bail!("Invalid month '{label}', expected YYYY-MM"),
            };
        }
        if let Some(year) = self.year {
            return match NaiveDate::from_ymd_opt(year, 1, 1) {
                Some(first) => Ok(Some(DateRange::year_of(first))),
                None => bail!("Invalid year {year}"),
            };
        }
        if let Some(days) = self.last {
            if days == 0 {
                bail!("--last needs at least one day");
            }
            return Ok(Some(DateRange::last_days(today, days)));
        }
        match (self.from, self.to) {
            (None, None) => Ok(None),
            (from, to) => {
                let start = from.unwrap_or(NaiveDate::MIN);
                let end = to.unwrap_or(today);
                if start > end {
                    bail!("--from {start} is after --to {end}");
                }
                Ok(Some(DateRange::new(start, end)))
            }
        }
    }
}
