use crate::error::{RankError, Result};
use crate::types::record::{Dataset, RELEASE_DATE_HEADER};
use chrono::{Datelike, NaiveDate};

const ISO_DATE: &str = "%Y-%m-%d";

/// Whole calendar months from `release` to `reference`. Days are ignored, so a
/// release in the reference month yields 0 and a future release is negative.
pub fn months_between(release: NaiveDate, reference: NaiveDate) -> i64 {
    i64::from(reference.year() - release.year()) * 12
        + (i64::from(reference.month()) - i64::from(release.month()))
}

pub fn parse_release_date(text: &str, formats: &[String]) -> Option<NaiveDate> {
    let text = text.trim();
    formats
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(ISO_DATE))
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

pub fn derive_recency(
    mut dataset: Dataset,
    reference: NaiveDate,
    formats: &[String],
) -> Result<Dataset> {
    for (index, record) in dataset.records.iter_mut().enumerate() {
        let release = parse_release_date(&record.release_date_text, formats).ok_or_else(|| {
            RankError::InvalidValue {
                row: index + 2,
                column: RELEASE_DATE_HEADER.to_string(),
                value: record.release_date_text.clone(),
            }
        })?;
        record.release_date = Some(release);
        record.months_since_release = Some(months_between(release, reference));
    }

    let future = dataset
        .records
        .iter()
        .filter(|record| record.months_since_release.is_some_and(|months| months < 0))
        .count();
    if future > 0 {
        tracing::warn!(
            records = future,
            reference = %reference,
            "release dates after the reference month produce negative recency"
        );
    }
    Ok(dataset)
}
