use crate::error::{RankError, Result};
use crate::types::record::{Column, Dataset, CRR_HEADER, TWF_HEADER, UEI_HEADER};
use crate::types::scoring::Metrics;

/// Every normalized column must be finite and inside [0, 1].
pub fn check_normalized(dataset: &Dataset, columns: &[Column]) -> Result<()> {
    let counts = columns
        .iter()
        .map(|&column| {
            let offending = dataset
                .records
                .iter()
                .filter(|record| !(0.0..=1.0).contains(&record.value(column)))
                .count();
            (column.header().to_string(), offending)
        })
        .collect::<Vec<_>>();
    gate("prepare", counts)
}

pub fn check_metrics(dataset: &Dataset) -> Result<()> {
    if dataset.records.iter().any(|record| record.metrics.is_none()) {
        return Err(RankError::MissingColumn(UEI_HEADER.to_string()));
    }
    let count = |select: fn(&Metrics) -> f64| {
        dataset
            .records
            .iter()
            .filter_map(|record| record.metrics.as_ref())
            .filter(|metrics| !select(metrics).is_finite())
            .count()
    };
    let counts = vec![
        (UEI_HEADER.to_string(), count(|m| m.engagement_index)),
        (CRR_HEADER.to_string(), count(|m| m.community_response_rate)),
        (TWF_HEADER.to_string(), count(|m| m.time_weight_factor)),
    ];
    gate("metrics", counts)
}

/// Raw input columns must be finite before outliers are computed.
pub fn check_inputs(dataset: &Dataset) -> Result<()> {
    gate("input", input_counts(dataset))
}

/// Whole-table NaN/inf check over a table read back from disk.
pub fn check_table(dataset: &Dataset) -> Result<()> {
    let mut counts = input_counts(dataset);
    if dataset.records.iter().any(|record| record.metrics.is_some()) {
        let offending = |select: fn(&Metrics) -> f64| {
            dataset
                .records
                .iter()
                .filter(|record| record.metrics.as_ref().map_or(true, |m| !select(m).is_finite()))
                .count()
        };
        counts.push((UEI_HEADER.to_string(), offending(|m| m.engagement_index)));
        counts.push((CRR_HEADER.to_string(), offending(|m| m.community_response_rate)));
        counts.push((TWF_HEADER.to_string(), offending(|m| m.time_weight_factor)));
    }
    gate("input", counts)
}

fn input_counts(dataset: &Dataset) -> Vec<(String, usize)> {
    Column::ALL
        .iter()
        .map(|&column| {
            let offending = dataset
                .records
                .iter()
                .filter(|record| !record.value(column).is_finite())
                .count();
            (column.header().to_string(), offending)
        })
        .collect()
}

fn gate(stage: &str, counts: Vec<(String, usize)>) -> Result<()> {
    if counts.iter().all(|(_, count)| *count == 0) {
        return Ok(());
    }
    for (column, count) in counts.iter().filter(|(_, count)| *count > 0) {
        tracing::error!(stage, column = %column, count, "non-finite values detected");
    }
    Err(RankError::DataQuality {
        stage: stage.to_string(),
        counts,
    })
}
