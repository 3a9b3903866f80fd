//! HTTP access to the barangay records service
//!
//! [`RecordsClient`] implements the [`cert_core::RecordsApi`] and
//! [`cert_core::DeliveryEndpoint`] seams, and carries the roster calls used by
//! the dashboard: document requests, residents and officials. Roster calls
//! take an [`cert_core::AuthContext`] and refuse to run once it is revoked.

pub mod client;
pub mod error;

pub use client::{
    ClientConfig, RecordsClient, DEFAULT_BASE_URL, DEFAULT_DELIVERY_PATH, DEFAULT_TIMEOUT_SECS,
};
pub use error::ClientError;
