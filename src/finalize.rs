use crate::error::{RankError, Result};
use crate::types::record::{Dataset, UEI_HEADER};
use crate::types::report::RankedModel;
use crate::types::scoring::{Metrics, Score, WeightPair};

/// `w1 * uei * twf + w2 * crr`. The search-time engagement boost and the
/// regularization term do not apply here.
pub fn final_score(metrics: &Metrics, weights: WeightPair) -> Score {
    weights.w1 * metrics.engagement_index * metrics.time_weight_factor
        + weights.w2 * metrics.community_response_rate
}

pub fn finalize(mut dataset: Dataset, weights: WeightPair) -> Result<Dataset> {
    for record in &mut dataset.records {
        let metrics = record
            .metrics
            .ok_or_else(|| RankError::MissingColumn(UEI_HEADER.to_string()))?;
        record.final_score = Some(final_score(&metrics, weights));
    }
    tracing::info!(records = dataset.len(), w1 = weights.w1, w2 = weights.w2, "finalized scores");
    Ok(dataset)
}

/// The `top` highest-scoring records, best first. Ties keep input order.
pub fn ranking(dataset: &Dataset, top: usize) -> Vec<RankedModel> {
    let mut scored = dataset
        .records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| record.final_score.map(|score| (index, score)))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(top)
        .enumerate()
        .map(|(position, (index, final_score))| RankedModel {
            rank: position + 1,
            label: dataset.label(index),
            final_score,
        })
        .collect()
}
