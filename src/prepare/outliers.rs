use crate::types::record::{Column, Dataset};

/// Quantile with linear interpolation between the two closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values
        .iter()
        .copied()
        .filter(|value| !value.is_nan())
        .collect::<Vec<_>>();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn remove_outliers(dataset: Dataset, columns: &[Column], q: f64) -> Dataset {
    columns
        .iter()
        .fold(dataset, |current, &column| filter_column(current, column, q))
}

fn filter_column(mut dataset: Dataset, column: Column, q: f64) -> Dataset {
    let Some(threshold) = quantile(&dataset.column_values(column), q) else {
        return dataset;
    };
    let before = dataset.len();
    dataset
        .records
        .retain(|record| record.value(column) <= threshold);
    tracing::info!(
        column = column.header(),
        threshold,
        dropped = before - dataset.len(),
        "removed outliers"
    );
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::Record;

    fn record(downloads: f64, likes: f64) -> Record {
        let mut record = Record::new("2024-01-01", [0.0; 7]);
        record.set_value(Column::MonthlyDownloads, downloads);
        record.set_value(Column::TotalLikes, likes);
        record
    }

    fn dataset(pairs: &[(f64, f64)]) -> Dataset {
        Dataset {
            headers: Vec::new(),
            records: pairs.iter().map(|&(d, l)| record(d, l)).collect(),
        }
    }

    fn rows(dataset: &Dataset) -> Vec<(f64, f64)> {
        dataset
            .records
            .iter()
            .map(|r| (r.value(Column::MonthlyDownloads), r.value(Column::TotalLikes)))
            .collect()
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&values, 0.5), Some(3.0));
        assert_eq!(quantile(&values, 1.0), Some(5.0));
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        let q99 = quantile(&values, 0.99).expect("non-empty");
        assert!((q99 - 4.96).abs() < 1e-12);
        assert_eq!(quantile(&[], 0.99), None);
    }

    #[test]
    fn quantile_skips_nan() {
        let values = [1.0, f64::NAN, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&values, 1.0), Some(5.0));
        assert_eq!(quantile(&[f64::NAN], 0.5), None);
    }

    #[test]
    fn removes_values_above_threshold_and_keeps_order() {
        let data = dataset(&[(3.0, 0.0), (1.0, 0.0), (100.0, 0.0), (2.0, 0.0)]);
        let filtered = remove_outliers(data, &[Column::MonthlyDownloads], 0.75);
        // q75 of [1,2,3,100] = 3 + 0.25 * 97 = 27.25
        assert_eq!(rows(&filtered), vec![(3.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    }

    #[test]
    fn sequential_filter_is_subset_of_single_column_filter() {
        let data = dataset(&[
            (1.0, 10.0),
            (2.0, 1.0),
            (3.0, 2.0),
            (4.0, 3.0),
            (10.0, 4.0),
        ]);
        let single = remove_outliers(data.clone(), &[Column::MonthlyDownloads], 0.75);
        let both = remove_outliers(
            data,
            &[Column::MonthlyDownloads, Column::TotalLikes],
            0.75,
        );
        let single_rows = rows(&single);
        assert!(both.len() <= single.len());
        assert!(rows(&both).iter().all(|row| single_rows.contains(row)));
    }

    #[test]
    fn filter_order_changes_the_result() {
        let skewed = dataset(&[
            (1.0, 9.0),
            (2.0, 8.0),
            (3.0, 1.0),
            (4.0, 2.0),
            (50.0, 3.0),
        ]);
        let a = remove_outliers(
            skewed.clone(),
            &[Column::MonthlyDownloads, Column::TotalLikes],
            0.5,
        );
        let b = remove_outliers(
            skewed,
            &[Column::TotalLikes, Column::MonthlyDownloads],
            0.5,
        );
        assert_eq!(rows(&a), vec![(2.0, 8.0), (3.0, 1.0)]);
        assert_eq!(rows(&b), vec![(3.0, 1.0), (4.0, 2.0)]);
    }

    #[test]
    fn empty_dataset_passes_through() {
        let filtered = remove_outliers(Dataset::default(), &[Column::TotalStars], 0.99);
        assert!(filtered.is_empty());
    }
}
