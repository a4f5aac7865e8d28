use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::history::MAX_REMAINING;
use crate::store::Backend;

#[derive(Parser)]
#[command(name = "quota-trend")]
#[command(about = "Tracks remaining API quota and renders a usage trend report")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the current quota, update history and regenerate chart and report
    Run,

    /// Record a reading by hand instead of fetching it
    Record(RecordArgs),

    /// Regenerate chart and report from stored history
    Render,

    /// Print stored history with per-day consumption
    Show(ShowArgs),
}

#[derive(Args, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// History file for the json backend
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Days of history to keep (0 keeps everything)
    #[arg(long, global = true)]
    pub retention_days: Option<i64>,

    /// Number of most recent periods drawn in the chart
    #[arg(long, global = true)]
    pub chart_window: Option<usize>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Remaining quota units
    #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_REMAINING))]
    pub remaining: u64,

    /// Day of the reading (defaults to today, UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
