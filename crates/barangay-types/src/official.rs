//! Barangay officials roster

use serde::{Deserialize, Serialize};

/// An official as listed by `GET officials`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Official {
    pub official_id: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub resident_id: String,
    #[serde(default)]
    pub start_term: String,
    #[serde(default)]
    pub end_term: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Official {
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

/// Body of `POST officials`. The linked resident supplies the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOfficial {
    pub position: String,
    pub start_term: String,
    pub end_term: String,
    pub status: String,
    pub resident_id: String,
}

impl NewOfficial {
    pub fn active(resident_id: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            start_term: String::new(),
            end_term: String::new(),
            status: "Active".to_string(),
            resident_id: resident_id.into(),
        }
    }

    pub fn with_term(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_term = start.into();
        self.end_term = end.into();
        self
    }
}
