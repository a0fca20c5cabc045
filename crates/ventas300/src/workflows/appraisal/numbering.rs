use chrono::{Datelike, NaiveDate};

use super::domain::AppraisalRequest;

/// Human readable request number: `SOL-<year>-<month>-<sequence>` where the
/// sequence counts requests created in the same calendar month, starting at 1.
///
/// Uniqueness relies on a single writer; the service holds its write lock
/// while numbering and appending.
pub fn next_request_number(existing: &[AppraisalRequest], today: NaiveDate) -> String {
    let same_month = existing
        .iter()
        .filter(|request| {
            request.created_on.year() == today.year() && request.created_on.month() == today.month()
        })
        .count();

    format_request_number(today, same_month + 1)
}

pub fn format_request_number(date: NaiveDate, sequence: usize) -> String {
    format!("SOL-{}-{:02}-{:03}", date.year(), date.month(), sequence)
}
