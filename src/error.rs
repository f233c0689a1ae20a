use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid value at row {row}, column '{column}': {value}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("workbook has no worksheets: {0}")]
    EmptyWorkbook(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("data quality check failed ({stage}): non-finite values {}", format_counts(.counts))]
    DataQuality {
        stage: String,
        counts: Vec<(String, usize)>,
    },

    #[error("column '{0}' has zero range and cannot be min-max normalized")]
    DegenerateColumn(String),

    #[error("at least 2 records are required to optimize weights, found {0}")]
    InsufficientRecords(usize),

    #[error("optimization failed: {0}")]
    Optimization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RankError {
    pub fn is_data_quality(&self) -> bool {
        matches!(
            self,
            Self::DataQuality { .. } | Self::DegenerateColumn(_) | Self::InsufficientRecords(_)
        )
    }
}

fn format_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(column, count)| format!("{column}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, RankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_quality_message_lists_per_column_counts() {
        let err = RankError::DataQuality {
            stage: "metrics".to_string(),
            counts: vec![("UEI".to_string(), 2), ("TWF".to_string(), 0)],
        };
        let message = err.to_string();
        assert!(message.contains("(metrics)"));
        assert!(message.contains("UEI=2, TWF=0"));
        assert!(err.is_data_quality());
    }

    #[test]
    fn input_errors_are_not_data_quality() {
        assert!(!RankError::MissingColumn("Release Date".to_string()).is_data_quality());
    }
}
