use crate::error::{RankError, Result};
use crate::types::config::DegeneratePolicy;
use crate::types::record::{Column, Dataset};

pub fn normalize(
    mut dataset: Dataset,
    columns: &[Column],
    policy: DegeneratePolicy,
) -> Result<Dataset> {
    for &column in columns {
        let values = dataset.column_values(column);
        let Some((min, max)) = min_max(&values) else {
            continue;
        };
        let range = max - min;

        if range == 0.0 {
            match policy {
                DegeneratePolicy::Error => {
                    return Err(RankError::DegenerateColumn(column.header().to_string()))
                }
                DegeneratePolicy::Zero => {
                    tracing::warn!(column = column.header(), "zero-range column mapped to 0");
                    for record in &mut dataset.records {
                        record.set_value(column, 0.0);
                    }
                    continue;
                }
            }
        }

        for record in &mut dataset.records {
            let value = record.value(column);
            record.set_value(column, (value - min) / range);
        }
    }
    Ok(dataset)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(min, max), &value| (min.min(value), max.max(value))),
    )
}
