use cert_core::{CertError, RemoteError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    #[error("Not signed in")]
    Unauthenticated,

    /// The service answered but reported `success: false`.
    #[error("{operation} rejected: {message}")]
    Rejected { operation: String, message: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Remote(e) => e,
            other => RemoteError::Transport(other.to_string()),
        }
    }
}

impl From<CertError> for ClientError {
    fn from(err: CertError) -> Self {
        match err {
            CertError::Remote(e) => ClientError::Remote(e),
            CertError::Unauthenticated => ClientError::Unauthenticated,
            other => ClientError::Remote(RemoteError::Transport(other.to_string())),
        }
    }
}

pub(crate) fn transport(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}
