pub mod load;
pub mod normalize;
pub mod outliers;
pub mod recency;

use crate::error::Result;
use crate::types::config::PrepareSettings;
use crate::types::record::Dataset;
use crate::validate;
use std::path::Path;

pub use load::load;
pub use normalize::normalize;
pub use outliers::remove_outliers;
pub use recency::derive_recency;

pub fn prepare(path: &Path, settings: &PrepareSettings) -> Result<Dataset> {
    let dataset = load(path)?;
    prepare_dataset(dataset, settings)
}

pub fn prepare_dataset(dataset: Dataset, settings: &PrepareSettings) -> Result<Dataset> {
    let loaded = dataset.len();
    validate::check_inputs(&dataset)?;
    let dataset = derive_recency(dataset, settings.reference_date, &settings.date_formats)?;
    let dataset = remove_outliers(
        dataset,
        &settings.outlier_columns,
        settings.outlier_quantile,
    );
    let dataset = normalize(dataset, &settings.normalize_columns, settings.degenerate)?;
    validate::check_normalized(&dataset, &settings.normalize_columns)?;

    tracing::info!(
        loaded,
        kept = dataset.len(),
        "prepared dataset"
    );
    Ok(dataset)
}
