//! Seams to the external records service and delivery endpoint

use async_trait::async_trait;
use barangay_types::{ApiAck, DocumentUpdate, ResidentProfile};

use crate::error::RemoteError;

/// A file attached to an outgoing e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "application/pdf".to_string(),
            bytes,
        }
    }
}

/// One message for the delivery endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub message: String,
    pub attachment: Attachment,
}

/// Reads and writes owned by the records service.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    /// `Ok(None)` when the service has no such resident.
    async fn fetch_resident(&self, resident_id: &str)
        -> Result<Option<ResidentProfile>, RemoteError>;

    /// Apply a partial update to a document request.
    async fn update_document(
        &self,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<ApiAck, RemoteError>;
}

/// Transmits an e-mail with attachment.
#[async_trait]
pub trait DeliveryEndpoint: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<ApiAck, RemoteError>;
}
