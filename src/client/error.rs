//! Errors raised by the admin data layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with an error envelope.
    #[error("{code} ({status}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("record {0} not found")]
    NotFound(String),
}

impl ClientError {
    /// True when the backend rejected an update because the record moved on.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Remote { status: 409, .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Remote { status: 401, .. })
    }
}
