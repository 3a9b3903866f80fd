use thiserror::Error;

/// Failures surfaced by composition, delivery and the operator session.
#[derive(Error, Debug)]
pub enum CertError {
    /// No completed, non-empty signature was captured. Ask the operator to sign.
    #[error("Please sign the document before generating the certificate")]
    MissingSignature,

    /// Signature surface dimensions were not finite, not positive, or too large.
    #[error("Invalid signature surface {width}x{height}")]
    InvalidSurface { width: f32, height: f32 },

    #[error("Failed to render certificate: {0}")]
    RenderFailure(String),

    /// The delivery endpoint failed or did not acknowledge. The request status
    /// was not touched.
    #[error("Failed to send email: {0}")]
    DeliveryFailure(String),

    /// The e-mail went out but the follow-up status update failed. Retry with
    /// [`crate::mark_delivered`]; do not re-send.
    #[error("Certificate for {document_id} was sent but the request was not marked completed: {reason}")]
    StatusUpdateFailure { document_id: String, reason: String },

    #[error("Failed to present certificate: {0}")]
    Presentation(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Records service error: {0}")]
    Remote(#[from] RemoteError),
}

/// Transport-level failure reported by a [`crate::RecordsApi`] or
/// [`crate::DeliveryEndpoint`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<cert_pdf::PdfError> for CertError {
    fn from(err: cert_pdf::PdfError) -> Self {
        CertError::RenderFailure(err.to_string())
    }
}
