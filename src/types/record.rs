use chrono::NaiveDate;
use serde::Deserialize;

use crate::types::scoring::Metrics;

pub const RELEASE_DATE_HEADER: &str = "Release Date";
pub const MONTHS_HEADER: &str = "Months Since Release";
pub const UEI_HEADER: &str = "UEI";
pub const CRR_HEADER: &str = "CRR";
pub const TWF_HEADER: &str = "TWF";
pub const FINAL_SCORE_HEADER: &str = "Final Score";

/// Headers produced by the pipeline itself. They are never carried through
/// as passthrough columns when a previous artifact is read back.
pub const DERIVED_HEADERS: [&str; 5] = [
    MONTHS_HEADER,
    UEI_HEADER,
    CRR_HEADER,
    TWF_HEADER,
    FINAL_SCORE_HEADER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    MonthlyDownloads,
    TotalLikes,
    TotalStars,
    OpenIssues,
    ClosedIssues,
    OpenPrs,
    ClosedPrs,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::MonthlyDownloads,
        Column::TotalLikes,
        Column::TotalStars,
        Column::OpenIssues,
        Column::ClosedIssues,
        Column::OpenPrs,
        Column::ClosedPrs,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Self::MonthlyDownloads => "Monthly Downloads (HF)",
            Self::TotalLikes => "Total Likes (HF)",
            Self::TotalStars => "Total Stars (GitHub)",
            Self::OpenIssues => "Open Issues (GitHub)",
            Self::ClosedIssues => "Closed Issues (GitHub)",
            Self::OpenPrs => "Open PRs (GitHub)",
            Self::ClosedPrs => "Closed PRs (GitHub)",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.header() == header.trim())
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub passthrough: Vec<String>,
    pub release_date_text: String,
    pub release_date: Option<NaiveDate>,
    pub months_since_release: Option<i64>,
    values: [f64; 7],
    pub metrics: Option<Metrics>,
    pub final_score: Option<f64>,
}

impl Record {
    pub fn new(release_date_text: impl Into<String>, values: [f64; 7]) -> Self {
        Self {
            passthrough: Vec::new(),
            release_date_text: release_date_text.into(),
            release_date: None,
            months_since_release: None,
            values,
            metrics: None,
            final_score: None,
        }
    }

    pub fn value(&self, column: Column) -> f64 {
        self.values[column.index()]
    }

    pub fn set_value(&mut self, column: Column, value: f64) {
        self.values[column.index()] = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_values(&self, column: Column) -> Vec<f64> {
        self.records
            .iter()
            .map(|record| record.value(column))
            .collect()
    }

    pub fn label(&self, index: usize) -> String {
        self.records
            .get(index)
            .and_then(|record| record.passthrough.first())
            .filter(|cell| !cell.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("row {}", index + 1))
    }
}

pub fn is_passthrough(header: &str) -> bool {
    let header = header.trim();
    header != RELEASE_DATE_HEADER
        && Column::from_header(header).is_none()
        && !DERIVED_HEADERS.contains(&header)
}
