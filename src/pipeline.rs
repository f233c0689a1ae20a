use crate::error::Result;
use crate::export::{self, FINAL_FILE, METRICS_FILE, PROCESSED_FILE};
use crate::finalize;
use crate::metrics::compute_metrics;
use crate::optimize::{self, WeightOutcome};
use crate::prepare;
use crate::report::{self, REPORT_FILE};
use crate::types::config::{MetricSettings, OptimizerSettings, PrepareSettings};
use crate::types::record::Dataset;
use crate::types::report::RunReport;
use crate::validate;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub prepare: PrepareSettings,
    pub metrics: MetricSettings,
    pub optimizer: OptimizerSettings,
    pub top: usize,
}

pub fn run(input: &Path, out_dir: &Path, settings: &PipelineSettings) -> Result<RunReport> {
    let dataset = prepare::prepare(input, &settings.prepare)?;
    let processed = export::write_csv(&dataset, &out_dir.join(PROCESSED_FILE))?;
    announce("processed data", &processed);

    let dataset = compute_metrics(dataset, &settings.metrics)?;
    let metrics = export::write_csv(&dataset, &out_dir.join(METRICS_FILE))?;
    announce("metrics data", &metrics);
    validate::check_metrics(&dataset)?;

    let (dataset, outcome) = score(dataset, &settings.optimizer)?;
    let scores = export::write_csv(&dataset, &out_dir.join(FINAL_FILE))?;
    announce("final scores", &scores);

    let report_path = out_dir.join(REPORT_FILE);
    let mut artifacts = vec![processed, metrics, scores];
    artifacts.push(report_path.clone());
    let run_report = build_report(input, &dataset, &outcome, settings.top, &artifacts)?;
    report::write_report(&run_report, &report_path)?;
    announce("run report", &report_path);
    Ok(run_report)
}

pub fn prepare_stage(input: &Path, output: &Path, settings: &PrepareSettings) -> Result<PathBuf> {
    let dataset = prepare::prepare(input, settings)?;
    let path = export::write_csv(&dataset, output)?;
    announce("processed data", &path);
    Ok(path)
}

pub fn metrics_stage(input: &Path, output: &Path, settings: &MetricSettings) -> Result<PathBuf> {
    let dataset = prepare::load(input)?;
    let dataset = compute_metrics(dataset, settings)?;
    let path = export::write_csv(&dataset, output)?;
    announce("metrics data", &path);
    validate::check_metrics(&dataset)?;
    Ok(path)
}

/// Metrics are recomputed from the table's normalized columns; the stored
/// `UEI`/`CRR`/`TWF` cells only take part in the whole-table check.
pub fn score_stage(
    input: &Path,
    output: &Path,
    report_path: Option<&Path>,
    settings: &PipelineSettings,
) -> Result<RunReport> {
    let dataset = prepare::load(input)?;
    validate::check_table(&dataset)?;
    let dataset = compute_metrics(dataset, &settings.metrics)?;
    validate::check_metrics(&dataset)?;

    let (dataset, outcome) = score(dataset, &settings.optimizer)?;
    let scores = export::write_csv(&dataset, output)?;
    announce("final scores", &scores);

    let mut artifacts = vec![scores];
    artifacts.extend(report_path.map(Path::to_path_buf));
    let run_report = build_report(input, &dataset, &outcome, settings.top, &artifacts)?;
    if let Some(path) = report_path {
        report::write_report(&run_report, path)?;
        announce("run report", path);
    }
    Ok(run_report)
}

fn score(dataset: Dataset, settings: &OptimizerSettings) -> Result<(Dataset, WeightOutcome)> {
    let outcome = optimize::optimize_weights(&dataset, settings)?;
    println!(
        "optimal weights: w1={:.4}, w2={:.4} (objective {:.6})",
        outcome.weights.w1, outcome.weights.w2, outcome.best_objective
    );
    let dataset = finalize::finalize(dataset, outcome.weights)?;
    Ok((dataset, outcome))
}

fn build_report(
    input: &Path,
    dataset: &Dataset,
    outcome: &WeightOutcome,
    top: usize,
    artifacts: &[PathBuf],
) -> Result<RunReport> {
    let bytes = fs::read(input)?;
    Ok(RunReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: Utc::now().to_rfc3339(),
        input: input.display().to_string(),
        input_sha256: sha256_hex(&bytes),
        strategy: outcome.strategy.as_str().to_string(),
        seed: outcome.seed,
        records: dataset.len(),
        weights: outcome.weights,
        best_objective: outcome.best_objective,
        evaluations: outcome.evaluations.clone(),
        top: finalize::ranking(dataset, top),
        artifacts: artifacts
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    })
}

fn announce(label: &str, path: &Path) {
    println!("{label}: {}", path.display());
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RankError;
    use crate::types::config::Strategy;
    use tempfile::TempDir;

    const HEADER: &str = "Model,Release Date,Monthly Downloads (HF),Total Likes (HF),Total Stars (GitHub),Open Issues (GitHub),Closed Issues (GitHub),Open PRs (GitHub),Closed PRs (GitHub)";

    fn settings() -> PipelineSettings {
        PipelineSettings {
            prepare: PrepareSettings {
                outlier_columns: Vec::new(),
                ..PrepareSettings::default()
            },
            metrics: MetricSettings::default(),
            optimizer: OptimizerSettings {
                strategy: Strategy::Random,
                n_calls: 20,
                n_initial_points: 5,
                seed: Some(3),
                initial: [2.0, 0.5],
            },
            top: 3,
        }
    }

    fn raw_csv(dir: &TempDir) -> PathBuf {
        let rows = [
            "alpha,2024年10月01日,5000,300,1200,10,90,2,40",
            "beta,2024年06月15日,800,40,150,25,25,5,5",
            "gamma,2023年11月20日,12000,900,4000,60,340,8,120",
            "delta,2024-02-01,150,5,30,0,0,0,0",
            "epsilon,2024/08/08,2500,120,600,15,45,3,12",
        ];
        let path = dir.path().join("models.csv");
        fs::write(&path, format!("{HEADER}\n{}\n", rows.join("\n"))).expect("csv should write");
        path
    }

    #[test]
    fn run_writes_every_artifact() {
        let dir = TempDir::new().expect("temp dir should be created");
        let input = raw_csv(&dir);
        let out_dir = dir.path().join("out");

        let report = run(&input, &out_dir, &settings()).expect("pipeline should succeed");
        for file in [PROCESSED_FILE, METRICS_FILE, FINAL_FILE, REPORT_FILE] {
            assert!(out_dir.join(file).exists(), "{file} missing");
        }
        assert_eq!(report.records, 5);
        assert_eq!(report.evaluations.len(), 20);
        assert_eq!(report.top.len(), 3);
        assert_eq!(report.seed, 3);
        assert_eq!(report.input_sha256.len(), 64);
        assert!(report.top[0].final_score >= report.top[1].final_score);

        let scores = fs::read_to_string(out_dir.join(FINAL_FILE)).expect("scores should exist");
        assert!(scores.lines().next().expect("header").ends_with("Final Score"));
        assert_eq!(scores.lines().count(), 6);
    }

    #[test]
    fn stages_chain_through_artifacts() {
        let dir = TempDir::new().expect("temp dir should be created");
        let input = raw_csv(&dir);
        let processed = prepare_stage(&input, &dir.path().join("p.csv"), &settings().prepare)
            .expect("prepare should succeed");
        let metrics = metrics_stage(&processed, &dir.path().join("m.csv"), &settings().metrics)
            .expect("metrics should succeed");
        let report_path = dir.path().join("report.json");
        let report = score_stage(
            &metrics,
            &dir.path().join("f.csv"),
            Some(report_path.as_path()),
            &settings(),
        )
        .expect("score should succeed");
        assert!(report_path.exists());
        assert_eq!(report.artifacts.len(), 2);
    }

    #[test]
    fn staged_and_full_runs_agree() {
        let dir = TempDir::new().expect("temp dir should be created");
        let input = raw_csv(&dir);
        let full = run(&input, &dir.path().join("full"), &settings()).expect("run");

        let processed = prepare_stage(&input, &dir.path().join("p.csv"), &settings().prepare)
            .expect("prepare");
        let metrics =
            metrics_stage(&processed, &dir.path().join("m.csv"), &settings().metrics).expect("metrics");
        let staged = score_stage(&metrics, &dir.path().join("f.csv"), None, &settings())
            .expect("score");
        assert_eq!(full.weights, staged.weights);
    }

    #[test]
    fn score_stage_rejects_non_finite_metrics() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("metrics.csv");
        fs::write(
            &path,
            format!(
                "{HEADER},Months Since Release,UEI,CRR,TWF\n\
                 a,2024-01-01,0.5,0.5,0.5,0,0,0,0,10,1.0,0,2.0\n\
                 b,2024-01-01,0.1,0.2,0.3,0,0,0,0,0,inf,0,NaN\n"
            ),
        )
        .expect("csv should write");

        let err = score_stage(&path, &dir.path().join("f.csv"), None, &settings())
            .expect_err("non-finite metrics should fail");
        assert!(err.is_data_quality());
        match err {
            RankError::DataQuality { stage, counts } => {
                assert_eq!(stage, "input");
                assert!(counts.contains(&("UEI".to_string(), 1)));
                assert!(counts.contains(&("TWF".to_string(), 1)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("f.csv").exists());
    }

    #[test]
    fn zero_month_record_trips_metrics_gate() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("processed.csv");
        fs::write(
            &path,
            format!(
                "{HEADER},Months Since Release\n\
                 a,2024-11-01,0.5,0.5,0.5,0,0,0,0,0\n\
                 b,2024-01-01,0.1,0.2,0.3,0,0,0,0,10\n"
            ),
        )
        .expect("csv should write");

        let err = metrics_stage(&path, &dir.path().join("m.csv"), &MetricSettings::default())
            .expect_err("zero months should fail the gate");
        assert!(matches!(err, RankError::DataQuality { .. }));
        // The artifact is still written for inspection.
        assert!(dir.path().join("m.csv").exists());
    }

    #[test]
    fn sha256_matches_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
