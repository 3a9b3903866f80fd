//! Filtering over document requests and residents

use std::fmt;
use std::str::FromStr;

use barangay_types::{DocumentRequest, RequestStatus, ResidentEntry, ResidentStatus};

/// Status selector of the requests table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RequestStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: &RequestStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            Ok(StatusFilter::Only(RequestStatus::from(s)))
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

fn contains_folded(field: Option<&String>, needle: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Requests whose requester name or document type contains `search`
/// (case-insensitive) and whose status passes `status`.
pub fn filter_documents<'a>(
    documents: &'a [DocumentRequest],
    search: &str,
    status: &StatusFilter,
) -> Vec<&'a DocumentRequest> {
    let needle = search.trim().to_lowercase();
    documents
        .iter()
        .filter(|doc| {
            needle.is_empty()
                || contains_folded(doc.requester_name.as_ref(), &needle)
                || contains_folded(doc.document_type.as_ref(), &needle)
                || contains_folded(doc.document_type_legacy.as_ref(), &needle)
        })
        .filter(|doc| status.matches(&doc.status))
        .collect()
}

/// Split residents into (pending, accepted). Any other status is left out.
pub fn partition_residents(
    residents: &[ResidentEntry],
) -> (Vec<&ResidentEntry>, Vec<&ResidentEntry>) {
    let mut pending = Vec::new();
    let mut accepted = Vec::new();
    for entry in residents {
        match entry.profile.registration() {
            ResidentStatus::Pending => pending.push(entry),
            ResidentStatus::Accepted => accepted.push(entry),
            ResidentStatus::Unknown => {}
        }
    }
    (pending, accepted)
}
