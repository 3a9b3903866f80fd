//! Issuing office identity printed on every certificate

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jurisdiction {
    pub barangay: String,
    pub municipality: String,
    pub province: String,
    pub country: String,
    pub signatory_name: String,
    pub signatory_title: String,
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Self {
            barangay: "Lamintak Sur".to_string(),
            municipality: "Medellin".to_string(),
            province: "Cebu".to_string(),
            country: "Philippines".to_string(),
            signatory_name: "Hon. Ambrosio Tahadlangit".to_string(),
            signatory_title: "Barangay Captain".to_string(),
        }
    }
}

impl Jurisdiction {
    /// Centered letterhead lines.
    pub fn header_lines(&self) -> Vec<String> {
        vec![
            format!("Republic of the {}", self.country),
            format!("Province of {}", self.province),
            format!("City/Municipality of {}", self.municipality),
            format!("Barangay {}", self.barangay),
            "Office of the Punong Barangay".to_string(),
        ]
    }

    /// "Barangay Lamintak Sur, Medellin, Cebu"
    pub fn locality(&self) -> String {
        format!(
            "Barangay {}, {}, {}",
            self.barangay, self.municipality, self.province
        )
    }
}
