use crate::types::record::{Column, Record};

/// Share of issues that are closed; exactly 0 when there are no issues.
pub fn community_response_rate(record: &Record) -> f64 {
    let open = record.value(Column::OpenIssues);
    let closed = record.value(Column::ClosedIssues);
    let total = open + closed;
    if total == 0.0 {
        0.0
    } else {
        closed / total
    }
}
