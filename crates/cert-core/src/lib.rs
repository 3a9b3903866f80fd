//! Barangay certificate composition and delivery
//!
//! A [`CompositionSession`] collects a hand-drawn signature for one document
//! request, renders the one-page certificate through the [`Composer`], and can
//! mail it to the requester before marking the request completed.
//!
//! The records service and the delivery endpoint are reached through the
//! [`RecordsApi`] and [`DeliveryEndpoint`] traits so the workflow can run
//! against the HTTP client in `records-client` or against in-memory fakes.

pub mod clock;
pub mod composer;
pub mod dashboard;
pub mod delivery;
pub mod error;
pub mod jurisdiction;
pub mod layout;
pub mod remote;
pub mod roster;
pub mod session;
pub mod signature;
pub mod text;
pub mod viewer;

#[cfg(test)]
mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use composer::{
    CertificateAssets, Composer, CompositionSession, RenderedCertificate, CERTIFICATE_FILE_NAME,
};
pub use dashboard::{summarize, Count, DashboardSummary};
pub use delivery::{certificate_email, deliver_by_email, mark_delivered, DeliveryReceipt};
pub use error::{CertError, RemoteError};
pub use jurisdiction::Jurisdiction;
pub use remote::{Attachment, DeliveryEndpoint, OutgoingEmail, RecordsApi};
pub use roster::{filter_documents, partition_residents, StatusFilter};
pub use session::{hash_password, AuthContext, Operator, OperatorCredentials, SessionStore};
pub use signature::input::{DeviceEvent, InputAdapter, SurfaceBounds};
pub use signature::{
    check_surface, SignatureCapture, SignatureImage, SignaturePad, SurfacePoint, MAX_SURFACE,
};
pub use text::CertificateText;
pub use viewer::{DocumentViewer, TempFileViewer, ViewHandle};
