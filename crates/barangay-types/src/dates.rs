//! Date wording used on certificates and in status updates

use chrono::{Datelike, NaiveDate};

/// "October 16, 2026" (month name, day, year), as stored in `email_sent_date`
/// and `approval_date`.
pub fn long_date(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

/// "16 of October, 2026", as used in the issuance sentence.
pub fn issuance_date(date: NaiveDate) -> String {
    format!("{} of {}, {}", date.day(), date.format("%B"), date.year())
}
