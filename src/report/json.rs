use crate::types::report::RunReport;

pub fn to_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn json_report_contains_weights_and_trace() {
        let rendered = to_json(&sample_report()).expect("json should serialize");
        assert!(rendered.contains("\"best_objective\": -1.75"));
        assert!(rendered.contains("\"strategy\": \"bayesian\""));
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(value["evaluations"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["top"][0]["label"], "qwen");
    }
}
