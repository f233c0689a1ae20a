mod cli;
mod config;
mod error;
mod export;
mod finalize;
mod metrics;
mod optimize;
mod pipeline;
mod prepare;
mod report;
mod types;
mod validate;

use crate::error::RankError;
use crate::pipeline::PipelineSettings;
use crate::types::config::{RankConfig, Strategy};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const DATA_QUALITY: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn pipeline_settings(
    loaded: &RankConfig,
    search: &cli::SearchArgs,
) -> Result<PipelineSettings, RankError> {
    let mut optimizer = loaded.optimizer_settings_with_calls(search.calls);
    if let Some(strategy) = search.strategy {
        optimizer.strategy = match strategy {
            cli::StrategyArg::Bayesian => Strategy::Bayesian,
            cli::StrategyArg::Evolution => Strategy::Evolution,
            cli::StrategyArg::Random => Strategy::Random,
        };
    }
    if search.seed.is_some() {
        optimizer.seed = search.seed;
    }
    optimizer.validate()?;

    let top = search.top.unwrap_or_else(|| loaded.top());
    if top == 0 {
        return Err(RankError::ConfigParse(
            "--top must be greater than 0".to_string(),
        ));
    }

    Ok(PipelineSettings {
        prepare: loaded.prepare_settings(),
        metrics: loaded.metric_settings(),
        optimizer,
        top,
    })
}

fn output_format(format: cli::ReportFormat) -> report::OutputFormat {
    match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
    }
}

fn default_output(loaded: &RankConfig, explicit: Option<PathBuf>, file: &str) -> PathBuf {
    explicit.unwrap_or_else(|| loaded.output_dir().join(file))
}

fn run() -> Result<i32, RankError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let loaded = config::load_config(Path::new("."), cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Run(cmd) => {
            let settings = pipeline_settings(&loaded, &cmd.search)?;
            let out_dir = cmd.out_dir.unwrap_or_else(|| loaded.output_dir());
            let run_report = pipeline::run(&cmd.input, &out_dir, &settings)?;
            let rendered = report::render(&run_report, output_format(cmd.format))?;
            println!("{rendered}");
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Prepare(cmd) => {
            let output = default_output(&loaded, cmd.output, export::PROCESSED_FILE);
            pipeline::prepare_stage(&cmd.input, &output, &loaded.prepare_settings())?;
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Metrics(cmd) => {
            let output = default_output(&loaded, cmd.output, export::METRICS_FILE);
            pipeline::metrics_stage(&cmd.input, &output, &loaded.metric_settings())?;
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Score(cmd) => {
            let settings = pipeline_settings(&loaded, &cmd.search)?;
            let output = default_output(&loaded, cmd.output, export::FINAL_FILE);
            let run_report =
                pipeline::score_stage(&cmd.input, &output, cmd.report.as_deref(), &settings)?;
            let rendered = report::render(&run_report, output_format(cmd.format))?;
            println!("{rendered}");
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            let code = if e.is_data_quality() {
                exit_code::DATA_QUALITY
            } else {
                exit_code::RUNTIME_FAILURE
            };
            std::process::exit(code);
        }
    }
}
