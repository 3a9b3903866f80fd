//! Resident profiles

use serde::{Deserialize, Serialize};

use crate::flex::text_or_number;

/// A resident record. `GET residents/{id}` returns this object; `GET residents`
/// returns a map of these keyed by resident id.
///
/// `age` and `yearsResidency` arrive as either strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidentProfile {
    #[serde(
        rename = "residentId",
        alias = "resident_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resident_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub civil_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barangay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        rename = "yearsResidency",
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub years_residency: Option<String>,
}

impl ResidentProfile {
    /// Leading integer of the age field, the way a lenient `parseInt` reads it.
    pub fn age_years(&self) -> Option<u32> {
        let digits: String = self
            .age
            .as_deref()?
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn registration(&self) -> ResidentStatus {
        match self.status.as_deref() {
            Some("Accepted") => ResidentStatus::Accepted,
            Some("Pending") => ResidentStatus::Pending,
            _ => ResidentStatus::Unknown,
        }
    }
}

/// Registration state of a resident account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidentStatus {
    Pending,
    Accepted,
    Unknown,
}

impl ResidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResidentStatus::Pending => "Pending",
            ResidentStatus::Accepted => "Accepted",
            ResidentStatus::Unknown => "Unknown",
        }
    }
}

/// A resident together with the key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentEntry {
    pub id: String,
    pub profile: ResidentProfile,
}
