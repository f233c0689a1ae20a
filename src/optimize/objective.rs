use crate::types::scoring::Metrics;

/// Extra weight on the engagement term while searching. The final score does
/// not apply it.
pub const ENGAGEMENT_BOOST: f64 = 1.5;
pub const REGULARIZATION: f64 = 0.2;

pub fn search_score(w1: f64, w2: f64, metrics: &Metrics) -> f64 {
    (ENGAGEMENT_BOOST * w1) * metrics.engagement_index * metrics.time_weight_factor
        + w2 * metrics.community_response_rate
}

/// Sum of `|s_i - s_j|` over unordered pairs divided by the ordered pair
/// count `n * (n - 1)`, i.e. half the mean absolute pairwise difference.
pub fn average_distance(scores: &[f64]) -> f64 {
    let n = scores.len();
    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            total += (scores[i] - scores[j]).abs();
        }
    }
    total / (n * n.saturating_sub(1)) as f64
}

pub fn regularization(w1: f64, w2: f64) -> f64 {
    (w1 - w2).abs() * REGULARIZATION
}

pub fn objective(w1: f64, w2: f64, metrics: &[Metrics]) -> f64 {
    let scores = metrics
        .iter()
        .map(|m| search_score(w1, w2, m))
        .collect::<Vec<_>>();
    -(average_distance(&scores) - regularization(w1, w2))
}
