use crate::optimize::Evaluation;
use crate::types::scoring::{Score, WeightPair};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RankedModel {
    pub rank: usize,
    pub label: String,
    pub final_score: Score,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub version: String,
    pub generated_at: String,
    pub input: String,
    pub input_sha256: String,
    pub strategy: String,
    pub seed: u64,
    pub records: usize,
    pub weights: WeightPair,
    pub best_objective: f64,
    pub evaluations: Vec<Evaluation>,
    pub top: Vec<RankedModel>,
    pub artifacts: Vec<String>,
}
