//! Document (certification) requests and their status updates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::long_date;

/// Lifecycle of a document request.
///
/// The records service stores the status as free text. The request views use
/// `Pending`, `Processing`, `Completed` and `Rejected`; the action buttons also
/// write `Approved`, which nothing else in the data model defines. Both are
/// accepted here and anything else is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Rejected,
    Approved,
    Other(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Processing => "Processing",
            RequestStatus::Completed => "Completed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Approved => "Approved",
            RequestStatus::Other(s) => s,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => RequestStatus::Pending,
            "Processing" => RequestStatus::Processing,
            "Completed" => RequestStatus::Completed,
            "Rejected" => RequestStatus::Rejected,
            "Approved" => RequestStatus::Approved,
            _ => RequestStatus::Other(s),
        }
    }
}

impl From<&str> for RequestStatus {
    fn from(s: &str) -> Self {
        RequestStatus::from(s.to_string())
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for a barangay document, as returned by `GET document`.
///
/// Older records use `first_name`/`last_name`, `email` and `documentType`
/// instead of the `requester_*` and `document_type` keys, so both spellings are
/// kept and resolved by the accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_contact: Option<String>,
    #[serde(
        rename = "contactNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(
        rename = "documentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_type_legacy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent_date: Option<String>,
    #[serde(
        rename = "paymentMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<String>,
    #[serde(rename = "residentId", default, skip_serializing_if = "Option::is_none")]
    pub resident_id: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl DocumentRequest {
    /// Name printed on the certificate and in the e-mail greeting.
    pub fn requester_display_name(&self) -> Option<String> {
        if let Some(name) = non_blank(&self.requester_name) {
            return Some(name.to_string());
        }
        let parts: Vec<&str> = [non_blank(&self.first_name), non_blank(&self.last_name)]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Address the finished certificate is mailed to.
    pub fn recipient_email(&self) -> Option<&str> {
        non_blank(&self.requester_email).or_else(|| non_blank(&self.email))
    }

    /// The requested document type, used as the purpose of the certificate.
    pub fn document_kind(&self) -> Option<&str> {
        non_blank(&self.document_type).or_else(|| non_blank(&self.document_type_legacy))
    }

    pub fn contact(&self) -> Option<&str> {
        non_blank(&self.requester_contact).or_else(|| non_blank(&self.contact_number))
    }

    /// Apply a successful partial update locally, mirroring what the service stored.
    pub fn apply(&mut self, update: &DocumentUpdate) {
        if let Some(status) = &update.status {
            self.status = status.clone();
        }
        if let Some(sent) = update.email_sent {
            self.email_sent = Some(sent);
        }
        if let Some(date) = &update.email_sent_date {
            self.email_sent_date = Some(date.clone());
        }
        if let Some(date) = &update.approval_date {
            self.approval_date = Some(date.clone());
        }
    }
}

/// Partial update accepted by `PUT document/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,
}

impl DocumentUpdate {
    /// Certificate was mailed: mark the request completed and record the date.
    pub fn delivered(on: NaiveDate) -> Self {
        Self {
            status: Some(RequestStatus::Completed),
            email_sent: Some(true),
            email_sent_date: Some(long_date(on)),
            approval_date: None,
        }
    }

    /// Requester was notified without changing the status.
    pub fn notified(on: NaiveDate) -> Self {
        Self {
            email_sent: Some(true),
            email_sent_date: Some(long_date(on)),
            ..Self::default()
        }
    }

    /// Status change; completing a request also stamps the approval date.
    pub fn status_change(status: RequestStatus, on: NaiveDate) -> Self {
        let approval_date = (status == RequestStatus::Completed).then(|| long_date(on));
        Self {
            status: Some(status),
            approval_date,
            ..Self::default()
        }
    }
}

/// `{success, message?}` acknowledgement returned by the records API and the
/// delivery endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_round_trips_known_and_unknown_values() {
        let statuses: Vec<RequestStatus> =
            serde_json::from_value(json!(["Pending", "Approved", "On Hold"])).unwrap();
        assert_eq!(
            statuses,
            vec![
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::Other("On Hold".to_string()),
            ]
        );
        assert_eq!(
            serde_json::to_value(&statuses).unwrap(),
            json!(["Pending", "Approved", "On Hold"])
        );
    }

    #[test]
    fn test_status_matching_is_case_sensitive() {
        assert_eq!(
            RequestStatus::from("completed"),
            RequestStatus::Other("completed".to_string())
        );
    }

    #[test]
    fn test_document_request_parses_mixed_keys() {
        let doc: DocumentRequest = serde_json::from_value(json!({
            "documentId": "doc-1",
            "first_name": "Juan",
            "last_name": "Dela Cruz",
            "email": "juan@example.com",
            "documentType": "Barangay Clearance",
            "status": "Processing",
            "residentId": "res-9",
            "contactNumber": "09171234567",
            "paymentMethod": "GCash"
        }))
        .unwrap();

        assert_eq!(doc.requester_display_name().as_deref(), Some("Juan Dela Cruz"));
        assert_eq!(doc.recipient_email(), Some("juan@example.com"));
        assert_eq!(doc.document_kind(), Some("Barangay Clearance"));
        assert_eq!(doc.status, RequestStatus::Processing);
        assert_eq!(doc.resident_id.as_deref(), Some("res-9"));
        assert_eq!(doc.contact(), Some("09171234567"));
    }

    #[test]
    fn test_requester_contact_takes_precedence() {
        let doc = DocumentRequest {
            requester_contact: Some("09998887777".to_string()),
            contact_number: Some("09171234567".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.contact(), Some("09998887777"));
        assert_eq!(DocumentRequest::default().contact(), None);
    }

    #[test]
    fn test_requester_name_takes_precedence() {
        let doc = DocumentRequest {
            requester_name: Some("Maria Clara".to_string()),
            first_name: Some("Ignored".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.requester_display_name().as_deref(), Some("Maria Clara"));
    }

    #[test]
    fn test_blank_name_is_absent() {
        let doc = DocumentRequest {
            requester_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.requester_display_name(), None);
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let doc: DocumentRequest = serde_json::from_value(json!({"documentId": "d"})).unwrap();
        assert_eq!(doc.status, RequestStatus::Pending);
    }

    #[test]
    fn test_delivered_update_serializes_only_set_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let update = DocumentUpdate::delivered(date);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "status": "Completed",
                "email_sent": true,
                "email_sent_date": "October 16, 2026"
            })
        );
    }

    #[test]
    fn test_status_change_adds_approval_date_only_when_completed() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let completed = DocumentUpdate::status_change(RequestStatus::Completed, date);
        assert_eq!(completed.approval_date.as_deref(), Some("January 2, 2026"));

        let rejected = DocumentUpdate::status_change(RequestStatus::Rejected, date);
        assert_eq!(rejected.approval_date, None);
        assert_eq!(
            serde_json::to_value(&rejected).unwrap(),
            json!({"status": "Rejected"})
        );
    }

    #[test]
    fn test_apply_update_locally() {
        let mut doc = DocumentRequest::default();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        doc.apply(&DocumentUpdate::delivered(date));
        assert_eq!(doc.status, RequestStatus::Completed);
        assert_eq!(doc.email_sent, Some(true));
        assert_eq!(doc.email_sent_date.as_deref(), Some("October 16, 2026"));
    }

    #[test]
    fn test_ack_defaults_to_failure_when_flag_missing() {
        let ack: ApiAck = serde_json::from_value(json!({"message": "boom"})).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.message.as_deref(), Some("boom"));
    }
}
