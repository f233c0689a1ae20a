use crate::error::Result;
use crate::types::record::{
    Column, Dataset, Record, CRR_HEADER, FINAL_SCORE_HEADER, MONTHS_HEADER,
    RELEASE_DATE_HEADER, TWF_HEADER, UEI_HEADER,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const PROCESSED_FILE: &str = "processed_data.csv";
pub const METRICS_FILE: &str = "metrics_data.csv";
pub const FINAL_FILE: &str = "final_scores.csv";

enum Cell {
    ReleaseDate,
    Value(Column),
    Passthrough(usize),
}

pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let layout = input_layout(&dataset.headers);
    let with_months = has_all(dataset, |record| record.months_since_release.is_some());
    let with_metrics = has_all(dataset, |record| record.metrics.is_some());
    let with_score = has_all(dataset, |record| record.final_score.is_some());

    let mut header = dataset.headers.clone();
    if with_months {
        header.push(MONTHS_HEADER.to_string());
    }
    if with_metrics {
        header.extend([UEI_HEADER, CRR_HEADER, TWF_HEADER].map(String::from));
    }
    if with_score {
        header.push(FINAL_SCORE_HEADER.to_string());
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;
    for record in &dataset.records {
        let mut row = layout
            .iter()
            .map(|cell| match cell {
                Cell::ReleaseDate => record
                    .release_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| record.release_date_text.clone()),
                Cell::Value(column) => record.value(*column).to_string(),
                Cell::Passthrough(index) => {
                    record.passthrough.get(*index).cloned().unwrap_or_default()
                }
            })
            .collect::<Vec<_>>();
        if let (true, Some(months)) = (with_months, record.months_since_release) {
            row.push(months.to_string());
        }
        if let (true, Some(metrics)) = (with_metrics, record.metrics) {
            row.push(metrics.engagement_index.to_string());
            row.push(metrics.community_response_rate.to_string());
            row.push(metrics.time_weight_factor.to_string());
        }
        if let (true, Some(score)) = (with_score, record.final_score) {
            row.push(score.to_string());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), records = dataset.len(), "wrote csv artifact");
    Ok(path.to_path_buf())
}

fn input_layout(headers: &[String]) -> Vec<Cell> {
    let mut passthrough = 0;
    headers
        .iter()
        .map(|header| {
            if header == RELEASE_DATE_HEADER {
                Cell::ReleaseDate
            } else if let Some(column) = Column::from_header(header) {
                Cell::Value(column)
            } else {
                passthrough += 1;
                Cell::Passthrough(passthrough - 1)
            }
        })
        .collect()
}

fn has_all(dataset: &Dataset, present: impl Fn(&Record) -> bool) -> bool {
    !dataset.is_empty() && dataset.records.iter().all(present)
}
