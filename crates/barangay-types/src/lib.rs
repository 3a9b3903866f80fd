//! Records data model shared by the certificate composer and the records client.
//!
//! Field names mirror the JSON produced by the remote records API, which mixes
//! `snake_case` and `camelCase` keys and sends some numbers as strings.

pub mod dates;
pub mod document;
pub mod official;
pub mod resident;

mod flex;

pub use dates::{issuance_date, long_date};
pub use document::{ApiAck, DocumentRequest, DocumentUpdate, RequestStatus};
pub use official::{NewOfficial, Official};
pub use resident::{ResidentEntry, ResidentProfile, ResidentStatus};
