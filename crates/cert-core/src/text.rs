//! Certificate wording

use barangay_types::{issuance_date, DocumentRequest, ResidentProfile};
use chrono::NaiveDate;

use crate::jurisdiction::Jurisdiction;

pub const TITLE: &str = "BARANGAY CERTIFICATION";
pub const SALUTATION: &str = "To Whom It May Concern:";
pub const CERTIFIED_BY: &str = "Certified by:";

pub const NAME_PLACEHOLDER: &str = "[Requester Name]";
pub const AGE_PLACEHOLDER: &str = "[Age]";
pub const CIVIL_STATUS_PLACEHOLDER: &str = "[Civil Status]";
pub const ADDRESS_PLACEHOLDER: &str = "[Complete Address]";
pub const RESIDENCY_PLACEHOLDER: &str = "[Year of Residency]";
pub const PURPOSE_PLACEHOLDER: &str = "[Purpose of the Certificate]";

/// Every string printed on the certificate, before layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateText {
    pub header: Vec<String>,
    pub title: String,
    pub salutation: String,
    pub certification: String,
    pub purpose: String,
    pub issuance: String,
    pub certified_by: String,
    pub signatory_name: String,
    pub signatory_title: String,
}

/// Present and non-blank. A zero age counts as missing, as the records
/// service uses 0 for "not provided".
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn age_text(resident: Option<&ResidentProfile>) -> String {
    present(resident.and_then(|r| r.age.as_deref()))
        .filter(|age| age.parse::<f64>().map(|n| n != 0.0).unwrap_or(true))
        .unwrap_or(AGE_PLACEHOLDER)
        .to_string()
}

impl CertificateText {
    pub fn assemble(
        request: &DocumentRequest,
        resident: Option<&ResidentProfile>,
        jurisdiction: &Jurisdiction,
        issued_on: NaiveDate,
    ) -> Self {
        let name = request
            .requester_display_name()
            .unwrap_or_else(|| NAME_PLACEHOLDER.to_string());
        let civil_status = present(resident.and_then(|r| r.civil_status.as_deref()))
            .unwrap_or(CIVIL_STATUS_PLACEHOLDER);
        let address =
            present(resident.and_then(|r| r.barangay.as_deref())).unwrap_or(ADDRESS_PLACEHOLDER);
        let since = present(resident.and_then(|r| r.years_residency.as_deref()))
            .unwrap_or(RESIDENCY_PLACEHOLDER);
        let purpose = request.document_kind().unwrap_or(PURPOSE_PLACEHOLDER);

        let certification = format!(
            "This is to certify that {}, {}, {}, and a resident of {}, Barangay {}, {}, {}, \
             has been a bonafide resident of this barangay since {}.",
            name,
            age_text(resident),
            civil_status,
            address,
            jurisdiction.barangay,
            jurisdiction.municipality,
            jurisdiction.province,
            since,
        );

        let purpose = format!(
            "This certification is issued upon the request of the above-named individual for {}.",
            purpose
        );

        let issuance = format!(
            "Issued this {} at {}, {}.",
            issuance_date(issued_on),
            jurisdiction.locality(),
            jurisdiction.country
        );

        Self {
            header: jurisdiction.header_lines(),
            title: TITLE.to_string(),
            salutation: SALUTATION.to_string(),
            certification,
            purpose,
            issuance,
            certified_by: CERTIFIED_BY.to_string(),
            signatory_name: jurisdiction.signatory_name.clone(),
            signatory_title: jurisdiction.signatory_title.clone(),
        }
    }
}
