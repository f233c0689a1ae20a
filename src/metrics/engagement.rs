use crate::types::record::{Column, Record};

/// `likes / months + stars / months + downloads`.
///
/// A zero month count is not guarded: the result is infinite or NaN and is
/// caught by the metrics quality gate.
pub fn engagement_index(record: &Record, months: i64) -> f64 {
    let months = months as f64;
    record.value(Column::TotalLikes) / months
        + record.value(Column::TotalStars) / months
        + record.value(Column::MonthlyDownloads)
}
