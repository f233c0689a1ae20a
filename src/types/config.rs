use crate::error::RankError;
use crate::types::record::Column;
use crate::types::scoring::{W1_BOUNDS, W2_BOUNDS};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankConfig {
    pub prepare: Option<PrepareConfig>,
    pub metrics: Option<MetricsConfig>,
    pub optimizer: Option<OptimizerConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrepareConfig {
    pub reference_date: Option<NaiveDate>,
    pub date_formats: Option<Vec<String>>,
    pub outlier_quantile: Option<f64>,
    pub outlier_columns: Option<Vec<Column>>,
    pub normalize_columns: Option<Vec<Column>>,
    pub degenerate: Option<DegeneratePolicy>,
}

/// What min-max normalization does with a column whose values are all equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    #[default]
    Error,
    Zero,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    pub t_ref: Option<f64>,
    pub epsilon: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Bayesian,
    Evolution,
    Random,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bayesian => "bayesian",
            Self::Evolution => "evolution",
            Self::Random => "random",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    pub strategy: Option<Strategy>,
    pub n_calls: Option<usize>,
    pub n_initial_points: Option<usize>,
    pub seed: Option<u64>,
    pub initial_w1: Option<f64>,
    pub initial_w2: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub top: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepareSettings {
    pub reference_date: NaiveDate,
    pub date_formats: Vec<String>,
    pub outlier_quantile: f64,
    pub outlier_columns: Vec<Column>,
    pub normalize_columns: Vec<Column>,
    pub degenerate: DegeneratePolicy,
}

impl Default for PrepareSettings {
    fn default() -> Self {
        Self {
            reference_date: NaiveDate::from_ymd_opt(2024, 11, 9).unwrap_or(NaiveDate::MIN),
            date_formats: vec![
                "%Y年%m月%d日".to_string(),
                "%Y-%m-%d".to_string(),
                "%Y/%m/%d".to_string(),
            ],
            outlier_quantile: 0.99,
            outlier_columns: vec![
                Column::MonthlyDownloads,
                Column::TotalLikes,
                Column::TotalStars,
            ],
            normalize_columns: Column::ALL.to_vec(),
            degenerate: DegeneratePolicy::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSettings {
    pub t_ref: f64,
    pub epsilon: f64,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            t_ref: 12.0,
            epsilon: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    pub strategy: Strategy,
    pub n_calls: usize,
    pub n_initial_points: usize,
    pub seed: Option<u64>,
    pub initial: [f64; 2],
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Bayesian,
            n_calls: 100,
            n_initial_points: 10,
            seed: None,
            initial: [2.0, 0.5],
        }
    }
}

pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_TOP: usize = 10;

impl RankConfig {
    pub fn prepare_settings(&self) -> PrepareSettings {
        let defaults = PrepareSettings::default();
        match &self.prepare {
            Some(prepare) => PrepareSettings {
                reference_date: prepare.reference_date.unwrap_or(defaults.reference_date),
                date_formats: prepare
                    .date_formats
                    .clone()
                    .unwrap_or(defaults.date_formats),
                outlier_quantile: prepare
                    .outlier_quantile
                    .unwrap_or(defaults.outlier_quantile),
                outlier_columns: prepare
                    .outlier_columns
                    .clone()
                    .unwrap_or(defaults.outlier_columns),
                normalize_columns: prepare
                    .normalize_columns
                    .clone()
                    .unwrap_or(defaults.normalize_columns),
                degenerate: prepare.degenerate.unwrap_or(defaults.degenerate),
            },
            None => defaults,
        }
    }

    pub fn metric_settings(&self) -> MetricSettings {
        let defaults = MetricSettings::default();
        match &self.metrics {
            Some(metrics) => MetricSettings {
                t_ref: metrics.t_ref.unwrap_or(defaults.t_ref),
                epsilon: metrics.epsilon.unwrap_or(defaults.epsilon),
            },
            None => defaults,
        }
    }

    pub fn optimizer_settings(&self) -> OptimizerSettings {
        self.optimizer_settings_with_calls(None)
    }

    // A defaulted initial design shrinks to the budget; an explicit one is kept.
    pub fn optimizer_settings_with_calls(&self, calls: Option<usize>) -> OptimizerSettings {
        let defaults = OptimizerSettings::default();
        let section = self.optimizer.clone().unwrap_or_default();
        let n_calls = calls.or(section.n_calls).unwrap_or(defaults.n_calls);
        OptimizerSettings {
            strategy: section.strategy.unwrap_or(defaults.strategy),
            n_calls,
            n_initial_points: section
                .n_initial_points
                .unwrap_or_else(|| defaults.n_initial_points.min(n_calls.max(1))),
            seed: section.seed.or(defaults.seed),
            initial: [
                section.initial_w1.unwrap_or(defaults.initial[0]),
                section.initial_w2.unwrap_or(defaults.initial[1]),
            ],
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|output| output.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn top(&self) -> usize {
        self.output
            .as_ref()
            .and_then(|output| output.top)
            .unwrap_or(DEFAULT_TOP)
    }

    pub fn validate(&self) -> Result<(), RankError> {
        let prepare = self.prepare_settings();
        if !(prepare.outlier_quantile > 0.0 && prepare.outlier_quantile <= 1.0) {
            return Err(RankError::ConfigParse(
                "prepare.outlier_quantile must be in (0.0, 1.0]".to_string(),
            ));
        }
        if prepare.date_formats.is_empty() {
            return Err(RankError::ConfigParse(
                "prepare.date_formats cannot be empty".to_string(),
            ));
        }

        let metrics = self.metric_settings();
        if !(metrics.epsilon > 0.0 && metrics.epsilon.is_finite()) {
            return Err(RankError::ConfigParse(
                "metrics.epsilon must be a positive number".to_string(),
            ));
        }
        if !(metrics.t_ref > 0.0 && metrics.t_ref.is_finite()) {
            return Err(RankError::ConfigParse(
                "metrics.t_ref must be a positive number".to_string(),
            ));
        }

        self.optimizer_settings().validate()?;

        if self.top() == 0 {
            return Err(RankError::ConfigParse(
                "output.top must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl OptimizerSettings {
    pub fn validate(&self) -> Result<(), RankError> {
        if self.n_calls == 0 {
            return Err(RankError::ConfigParse(
                "optimizer.n_calls must be greater than 0".to_string(),
            ));
        }
        if self.n_initial_points == 0 || self.n_initial_points > self.n_calls {
            return Err(RankError::ConfigParse(format!(
                "optimizer.n_initial_points must be between 1 and n_calls ({})",
                self.n_calls
            )));
        }
        let [w1, w2] = self.initial;
        if !W1_BOUNDS.contains(&w1) || !W2_BOUNDS.contains(&w2) {
            return Err(RankError::ConfigParse(format!(
                "optimizer initial point ({w1}, {w2}) lies outside w1 {:?}, w2 {:?}",
                W1_BOUNDS, W2_BOUNDS
            )));
        }
        Ok(())
    }
}
