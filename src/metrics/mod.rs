pub mod engagement;
pub mod response;
pub mod time_weight;

use crate::error::{RankError, Result};
use crate::types::config::MetricSettings;
use crate::types::record::{Dataset, MONTHS_HEADER};
use crate::types::scoring::Metrics;

pub use engagement::engagement_index;
pub use response::community_response_rate;
pub use time_weight::time_weight_factor;

pub fn compute_metrics(mut dataset: Dataset, settings: &MetricSettings) -> Result<Dataset> {
    for record in &mut dataset.records {
        let months = record
            .months_since_release
            .ok_or_else(|| RankError::MissingColumn(MONTHS_HEADER.to_string()))?;
        record.metrics = Some(Metrics::new(
            engagement_index(record, months),
            community_response_rate(record),
            time_weight_factor(months, settings.t_ref, settings.epsilon),
        ));
    }
    tracing::info!(records = dataset.len(), "computed metrics");
    Ok(dataset)
}
