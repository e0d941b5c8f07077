//! Top-level CLI definition and dispatch.
//!
//! One-shot operational commands against an existing store file: row-count
//! stats, recent log entries, and a manual retention sweep. Talks to the
//! executor directly — no background tasks for short-lived invocations.

#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::{Colorize, control};

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::store::executor::StoreExecutor;
use crate::store::records::{EntityKind, Level};
use crate::tasks::sweeper::sweep_once;

/// Telemetry Store — local batched telemetry database.
#[derive(Debug, Parser)]
#[command(
    name = "tstore",
    author,
    version,
    about = "Telemetry Store - embedded batched telemetry database",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override database file path.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show row counts and database size.
    Stats,
    /// Show recent log entries, newest first.
    Logs(LogsArgs),
    /// Run a one-shot retention sweep.
    Sweep(SweepArgs),
}

#[derive(Debug, Clone, Args)]
struct LogsArgs {
    /// Only entries from this source.
    #[arg(long, value_name = "SOURCE")]
    source: Option<String>,
    /// Only entries at this level (debug/info/warn/error/critical).
    #[arg(long, value_name = "LEVEL")]
    level: Option<Level>,
    /// Maximum entries to show.
    #[arg(long, default_value_t = 50, value_name = "N")]
    limit: usize,
}

#[derive(Debug, Clone, Args)]
struct SweepArgs {
    /// Override the configured retention horizon.
    #[arg(long, value_name = "DAYS")]
    retention_days: Option<u32>,
}

/// Execute a parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.no_color {
        control::set_override(false);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.paths.db_path = db.clone();
    }
    let executor = StoreExecutor::open(&config.paths.db_path)?;

    match &cli.command {
        Command::Stats => run_stats(&executor),
        Command::Logs(args) => run_logs(&executor, args),
        Command::Sweep(args) => {
            run_sweep(&executor, args.retention_days.unwrap_or(config.retention.days))
        }
    }
}

fn run_stats(executor: &StoreExecutor) -> Result<()> {
    println!("{}", "Telemetry store".bold());
    println!("  db: {}", executor.path().display());

    let mut total: i64 = 0;
    for kind in EntityKind::ALL {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = executor
            .query_one(&sql, [], |row| row.get(0))?
            .unwrap_or(0);
        total += count;
        println!("  {:<22} {count:>10}", kind.table());
    }
    let size: i64 = executor
        .query_one(
            "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
            [],
            |row| row.get(0),
        )?
        .unwrap_or(0);
    println!("  {:<22} {total:>10}", "total rows".bold());
    println!("  {:<22} {size:>10}", "size (bytes)".bold());
    Ok(())
}

fn run_logs(executor: &StoreExecutor, args: &LogsArgs) -> Result<()> {
    let mut sql = String::from(
        "SELECT timestamp, source, level, message FROM log_entries WHERE 1=1",
    );
    let mut params: Vec<rusqlite::types::Value> = Vec::new();
    if let Some(source) = &args.source {
        sql.push_str(" AND source = ?");
        params.push(source.clone().into());
    }
    if let Some(level) = args.level {
        sql.push_str(" AND level = ?");
        params.push(level.as_str().to_string().into());
    }
    sql.push_str(" ORDER BY id DESC LIMIT ?");
    params.push(i64::try_from(args.limit).unwrap_or(i64::MAX).into());

    let rows: Vec<(String, String, String, String)> = executor.query_all(
        &sql,
        rusqlite::params_from_iter(params.iter()),
        |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        },
    )?;

    if rows.is_empty() {
        println!("no matching log entries");
        return Ok(());
    }
    for (timestamp, source, level, message) in rows {
        let level_label = match level.as_str() {
            "error" | "critical" => level.red().bold(),
            "warn" => level.yellow(),
            "debug" => level.dimmed(),
            _ => level.normal(),
        };
        println!("{} {:<10} {:<8} {}", timestamp.dimmed(), source, level_label, message);
    }
    Ok(())
}

fn run_sweep(executor: &StoreExecutor, retention_days: u32) -> Result<()> {
    let report = sweep_once(executor, retention_days);
    println!(
        "swept rows older than {} ({retention_days} day horizon)",
        report.cutoff.bold()
    );
    for (table, deleted) in &report.swept {
        println!("  {table:<22} {deleted:>8} deleted");
    }
    if report.failures > 0 {
        eprintln!("{} table sweep(s) failed; see log output", report.failures);
    }
    Ok(())
}
