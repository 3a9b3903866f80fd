//! Overview statistics for the dashboard

use barangay_types::{DocumentRequest, Official, RequestStatus, ResidentEntry};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const AGE_BUCKETS: [&str; 5] = ["0-18", "19-30", "31-45", "46-60", "61+"];
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_residents: usize,
    pub total_officials: usize,
    pub total_documents: usize,
    /// Requests in `Processing`.
    pub awaiting_approval: usize,
    pub gender: Vec<Count>,
    pub age: Vec<Count>,
    pub document_status: Vec<Count>,
    /// Requests per month of `year`, January first.
    pub monthly_requests: Vec<Count>,
    pub year: i32,
}

/// Increment `label`'s count, appending it on first sight.
fn tally(counts: &mut Vec<Count>, label: &str) {
    match counts.iter_mut().find(|c| c.label == label) {
        Some(count) => count.value += 1,
        None => counts.push(Count {
            label: label.to_string(),
            value: 1,
        }),
    }
}

/// Values containing "male" are folded to `Male` or `Female`; anything else is
/// kept as written. Blank values are skipped.
fn normalize_gender(raw: &str) -> Option<String> {
    let gender = raw.trim();
    if gender.is_empty() {
        return None;
    }
    let lower = gender.to_lowercase();
    Some(if lower.contains("female") {
        "Female".to_string()
    } else if lower.contains("male") {
        "Male".to_string()
    } else {
        gender.to_string()
    })
}

fn age_bucket(age: u32) -> usize {
    match age {
        0..=18 => 0,
        19..=30 => 1,
        31..=45 => 2,
        46..=60 => 3,
        _ => 4,
    }
}

/// Calendar date of a request timestamp (RFC 3339, ISO date-time, or ISO date).
fn request_date(timestamp: &str) -> Option<NaiveDate> {
    let ts = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok()
}

pub fn summarize(
    residents: &[ResidentEntry],
    officials: &[Official],
    documents: &[DocumentRequest],
    year: i32,
) -> DashboardSummary {
    let mut gender = Vec::new();
    let mut age: Vec<Count> = AGE_BUCKETS
        .iter()
        .map(|label| Count {
            label: label.to_string(),
            value: 0,
        })
        .collect();

    for entry in residents {
        if let Some(g) = entry.profile.gender.as_deref().and_then(normalize_gender) {
            tally(&mut gender, &g);
        }
        if let Some(years) = entry.profile.age_years() {
            age[age_bucket(years)].value += 1;
        }
    }

    let mut document_status = Vec::new();
    let mut monthly = [0usize; 12];
    for doc in documents {
        tally(&mut document_status, doc.status.as_str());
        if let Some(date) = doc.timestamp.as_deref().and_then(request_date) {
            if date.year() == year {
                monthly[date.month0() as usize] += 1;
            }
        }
    }

    DashboardSummary {
        total_residents: residents.len(),
        total_officials: officials.len(),
        total_documents: documents.len(),
        awaiting_approval: documents
            .iter()
            .filter(|d| d.status == RequestStatus::Processing)
            .count(),
        gender,
        age,
        document_status,
        monthly_requests: MONTHS
            .iter()
            .zip(monthly)
            .map(|(month, value)| Count {
                label: month.to_string(),
                value,
            })
            .collect(),
        year,
    }
}
