//! Hivelog CLI
//!
//! Thin wrapper around hivelog-core functions for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Show recent errors from one source
//! hivelog --log-root /tmp/app_logs query --level ERROR --source web_server
//!
//! # Everything matching a keyword on a specific day
//! hivelog query --date 2026-02-12 --keyword timeout
//!
//! # Discover what sources exist before querying
//! hivelog sources
//!
//! # Drop partitions older than 30 days (preview first)
//! hivelog sweep --keep-days 30 --dry-run
//! hivelog sweep --keep-days 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use hivelog_core::{
    config::{local_date_for, parse_timezone},
    query::{self, QueryFilter},
    retention, Level,
};

/// Hivelog - query and maintain partitioned NDJSON application logs
#[derive(Parser)]
#[command(name = "hivelog")]
#[command(version = "0.1.0")]
#[command(about = "Query and maintain partitioned NDJSON application logs")]
struct Cli {
    /// Log root directory (must match the emitting application's)
    #[arg(short = 'r', long, global = true, default_value = "/tmp/app_logs")]
    log_root: PathBuf,

    /// IANA display timezone, also used for partition-date math
    #[arg(short, long, global = true, default_value = "UTC")]
    timezone: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query log records, newest first
    Query {
        /// How many minutes back to search; ignored if --date is set
        #[arg(long, default_value_t = 60)]
        minutes_ago: u64,

        /// Specific partition date to query (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Filter by source name
        #[arg(long)]
        source: Option<String>,

        /// Filter by level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
        #[arg(long)]
        level: Option<Level>,

        /// Case-insensitive text search in the msg field
        #[arg(long)]
        keyword: Option<String>,

        /// Maximum rows to return
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// List available log sources and their entry counts
    Sources {
        /// Restrict to one partition date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete whole date partitions older than the retention window
    Sweep {
        /// Days of partitions to keep, counted back from today
        #[arg(long)]
        keep_days: u32,

        /// Report what would be removed without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tz = parse_timezone(&cli.timezone)?;

    match cli.command {
        Commands::Query {
            minutes_ago,
            date,
            source,
            level,
            keyword,
            limit,
        } => {
            let since = if date.is_some() {
                None
            } else {
                Some(Duration::from_secs(minutes_ago * 60))
            };
            let filter = QueryFilter {
                date,
                since,
                source,
                level,
                keyword,
                limit,
            };
            run_query(&cli.log_root, tz, &filter)
        }
        Commands::Sources { date } => run_sources(&cli.log_root, tz, date),
        Commands::Sweep { keep_days, dry_run } => {
            run_sweep(&cli.log_root, tz, keep_days, dry_run)
        }
    }
}

fn run_query(log_root: &std::path::Path, tz: Tz, filter: &QueryFilter) -> Result<()> {
    let records = query::records(log_root, tz, filter)?;

    if records.is_empty() {
        println!("No log entries found matching the criteria.");
        return Ok(());
    }

    println!("Log entries: {}", records.len());
    println!();
    for record in &records {
        println!(
            "{} {:8} {:16} {}:{} {} - {}",
            format_local(record.ts, tz),
            record.level.as_str(),
            record.source,
            record.file,
            record.line,
            record.func,
            record.msg
        );
    }
    Ok(())
}

fn run_sources(log_root: &std::path::Path, tz: Tz, date: Option<NaiveDate>) -> Result<()> {
    let summaries = query::sources(log_root, date)?;

    if summaries.is_empty() {
        println!("No log data found.");
        return Ok(());
    }

    println!("Log sources:");
    println!();
    println!(
        "{:<20} {:<12} {:>8}  {:<23}  {:<23}",
        "source", "date", "entries", "earliest", "latest"
    );
    for summary in &summaries {
        println!(
            "{:<20} {:<12} {:>8}  {:<23}  {:<23}",
            summary.source,
            summary.date,
            summary.entries,
            format_local(summary.earliest, tz),
            format_local(summary.latest, tz)
        );
    }
    Ok(())
}

fn run_sweep(log_root: &std::path::Path, tz: Tz, keep_days: u32, dry_run: bool) -> Result<()> {
    let today = local_date_for(now_ns(), tz);
    let cutoff = retention::cutoff_for(today, keep_days);
    let report = retention::sweep(log_root, cutoff, dry_run)?;

    let verb = if dry_run { "Would remove" } else { "Removed" };
    if report.removed.is_empty() {
        println!("Nothing to remove (cutoff {}, {} kept).", cutoff, report.kept);
        return Ok(());
    }

    println!("{} {} partition(s) older than {}:", verb, report.removed.len(), cutoff);
    for path in &report.removed {
        println!("  {}", path.display());
    }
    println!("Kept: {}", report.kept);
    Ok(())
}

fn format_local(ts_ns: u64, tz: Tz) -> String {
    DateTime::from_timestamp_nanos(ts_ns as i64)
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

fn now_ns() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .map(|ns| ns as u64)
        .unwrap_or(0)
}
