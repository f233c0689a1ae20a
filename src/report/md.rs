use crate::types::report::RunReport;

pub fn to_markdown(report: &RunReport) -> String {
    let mut output = String::new();
    output.push_str("# Model Ranking Report\n\n");
    output.push_str(&format!(
        "- input: {}\n- records: {}\n- strategy: {} (seed {})\n- evaluations: {}\n\n",
        report.input,
        report.records,
        report.strategy,
        report.seed,
        report.evaluations.len()
    ));

    output.push_str("## Optimal Weights\n\n");
    output.push_str(&format!(
        "- w1: {:.4}\n- w2: {:.4}\n- objective: {:.6}\n\n",
        report.weights.w1, report.weights.w2, report.best_objective
    ));

    output.push_str("## Top Models\n\n");
    if report.top.is_empty() {
        output.push_str("- none\n");
    } else {
        output.push_str("| Rank | Model | Final Score |\n|---:|---|---:|\n");
        for model in &report.top {
            output.push_str(&format!(
                "| {} | {} | {:.4} |\n",
                model.rank, model.label, model.final_score
            ));
        }
    }

    if !report.artifacts.is_empty() {
        output.push_str("\n## Artifacts\n\n");
        for artifact in &report.artifacts {
            output.push_str(&format!("- {artifact}\n"));
        }
    }

    output
}
