pub mod json;
pub mod md;

use crate::error::{RankError, Result};
use crate::types::report::RunReport;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(RankError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}

pub fn write_report(report: &RunReport, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json::to_json(report)?)?;
    Ok(path.to_path_buf())
}
