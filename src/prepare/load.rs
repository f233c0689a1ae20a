use crate::error::{RankError, Result};
use crate::types::record::{
    is_passthrough, Column, Dataset, Record, CRR_HEADER, DERIVED_HEADERS, MONTHS_HEADER,
    RELEASE_DATE_HEADER, TWF_HEADER, UEI_HEADER,
};
use crate::types::scoring::Metrics;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate};
use std::path::Path;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn load(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(RankError::InputNotFound(path.display().to_string()));
    }
    let table = read_table(path)?;
    let dataset = from_table(table)?;
    tracing::info!(path = %path.display(), records = dataset.len(), "loaded input table");
    Ok(dataset)
}

pub fn read_table(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension == "csv" {
        read_csv(path)
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path)
    } else {
        Err(RankError::UnsupportedFormat(path.display().to_string()))
    }
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();
    let rows = reader
        .records()
        .map(|row| row.map(|cells| cells.iter().map(String::from).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
    Ok(RawTable { headers, rows })
}

fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RankError::EmptyWorkbook(path.display().to_string()))??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|row: &Vec<String>| row.iter().any(|cell| !cell.is_empty()))
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::DateTime(value) => excel_serial_date(value.as_f64())
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(text) => text.chars().take(10).collect(),
        other => other.to_string(),
    }
}

/// Converts an Excel serial day number (1900 date system) to a calendar date.
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

struct Layout {
    release_date: usize,
    columns: [usize; 7],
    months: Option<usize>,
    metrics: Option<[usize; 3]>,
    passthrough: Vec<usize>,
}

fn locate(headers: &[String]) -> Result<Layout> {
    let find = |name: &str| headers.iter().position(|header| header.trim() == name);
    let require =
        |name: &str| find(name).ok_or_else(|| RankError::MissingColumn(name.to_string()));

    let release_date = require(RELEASE_DATE_HEADER)?;
    let mut columns = [0usize; 7];
    for (slot, column) in columns.iter_mut().zip(Column::ALL) {
        *slot = require(column.header())?;
    }
    let metrics = match (find(UEI_HEADER), find(CRR_HEADER), find(TWF_HEADER)) {
        (Some(uei), Some(crr), Some(twf)) => Some([uei, crr, twf]),
        _ => None,
    };
    let passthrough = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| is_passthrough(header))
        .map(|(index, _)| index)
        .collect();

    Ok(Layout {
        release_date,
        columns,
        months: find(MONTHS_HEADER),
        metrics,
        passthrough,
    })
}

pub fn from_table(table: RawTable) -> Result<Dataset> {
    let layout = locate(&table.headers)?;
    let mut records = Vec::with_capacity(table.rows.len());

    for (index, row) in table.rows.iter().enumerate() {
        // header occupies line 1
        let line = index + 2;
        let cell = |position: usize| row.get(position).map(String::as_str).unwrap_or("");

        let mut values = [0.0; 7];
        for ((value, position), column) in values.iter_mut().zip(layout.columns).zip(Column::ALL)
        {
            *value = parse_number(cell(position)).ok_or_else(|| RankError::InvalidValue {
                row: line,
                column: column.header().to_string(),
                value: cell(position).to_string(),
            })?;
        }

        let mut record = Record::new(cell(layout.release_date), values);
        record.passthrough = layout
            .passthrough
            .iter()
            .map(|&position| cell(position).to_string())
            .collect();

        if let Some(position) = layout.months {
            let text = cell(position);
            let months = parse_number(text)
                .filter(|value| value.fract() == 0.0)
                .ok_or_else(|| RankError::InvalidValue {
                    row: line,
                    column: MONTHS_HEADER.to_string(),
                    value: text.to_string(),
                })?;
            record.months_since_release = Some(months as i64);
        }

        if let Some([uei, crr, twf]) = layout.metrics {
            record.metrics = Some(Metrics::new(
                parse_metric(cell(uei)),
                parse_metric(cell(crr)),
                parse_metric(cell(twf)),
            ));
        }

        records.push(record);
    }

    let headers = table
        .headers
        .into_iter()
        .map(|header| header.trim().to_string())
        .filter(|header| !DERIVED_HEADERS.contains(&header.as_str()))
        .collect();

    Ok(Dataset { headers, records })
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Empty metric cells read back as NaN so the data-quality gate reports them.
fn parse_metric(text: &str) -> f64 {
    parse_number(text).unwrap_or(f64::NAN)
}
