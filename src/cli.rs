use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::store::parse_day;

#[derive(Parser)]
#[command(name = "follower-ledger")]
#[command(about = "Daily follower snapshots and upload queue bookkeeping")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true, default_value_t = false)]
    pub debug: bool,

    /// Log level
    #[arg(long, short = 'l', value_enum, global = true)]
    pub level: Option<LogLevel>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the daily snapshot files
    #[arg(long, env = "DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn upload_dir(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Queue(args) => args.upload_dir.clone(),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Record today's follower snapshot from an exported follower list
    Track(TrackArgs),

    /// Display a stored snapshot
    Show(ShowArgs),

    /// List the days with a stored snapshot
    Days(DaysArgs),

    /// Compare the followers of two stored days
    Diff(DiffArgs),

    /// Show the next queued photo for upload
    Queue(QueueArgs),
}

#[derive(Parser)]
pub struct TrackArgs {
    /// Account the followers belong to
    #[arg(long, short = 'a', value_parser = parse_account)]
    pub account: String,

    /// Follower list: JSON array or one username per line, `-` for stdin
    #[arg(long, short = 'f', default_value = "-")]
    pub followers: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    #[arg(long, short = 'a', value_parser = parse_account)]
    pub account: String,

    /// Day to show as YYYYMMDD (defaults to today, UTC)
    #[arg(long, value_parser = parse_day)]
    pub date: Option<NaiveDate>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DaysArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DiffArgs {
    #[arg(long, short = 'a', value_parser = parse_account)]
    pub account: String,

    /// Older day as YYYYMMDD
    #[arg(long, value_parser = parse_day)]
    pub from: Option<NaiveDate>,

    /// Newer day as YYYYMMDD
    #[arg(long, value_parser = parse_day)]
    pub to: Option<NaiveDate>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct QueueArgs {
    /// Upload directory (defaults to <data dir>/upload)
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Take the next photo out of the queue after an external upload
    #[arg(long, default_value_t = false)]
    pub mark_uploaded: bool,
}

fn parse_account(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("account must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}
