use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "modelrank",
    version,
    about = "Rank open models by engagement, community response and recency"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file to use instead of ./modelrank.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage and write all artifacts plus a run report
    Run(RunCommand),
    /// Load, derive recency, remove outliers and normalize
    Prepare(PrepareCommand),
    /// Compute UEI, CRR and TWF over a processed table
    Metrics(MetricsCommand),
    /// Search blend weights and write final scores for a metrics table
    Score(ScoreCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    Bayesian,
    Evolution,
    Random,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

/// Weight-search overrides shared by `run` and `score`.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
    /// Objective evaluation budget
    #[arg(long)]
    pub calls: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of ranked models in the summary
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Args)]
pub struct RunCommand {
    /// Spreadsheet (.xlsx, .xls, .ods) or CSV file
    pub input: PathBuf,
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    #[command(flatten)]
    pub search: SearchArgs,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct PrepareCommand {
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct MetricsCommand {
    /// Processed table written by `prepare`
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ScoreCommand {
    /// Metrics table written by `metrics`
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also write the JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
    #[command(flatten)]
    pub search: SearchArgs,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}
