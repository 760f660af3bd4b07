//! Error taxonomy shared by provisioning and validation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    /// A required credential is absent from config, environment, and flags.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// The platform answered with a non-success status. The response body is
    /// kept verbatim for diagnosis.
    #[error("platform rejected the request (HTTP {status}): {body}")]
    RemoteRejection { status: u16, body: String },

    /// Network-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A remote payload (or the local record file) was not parseable as the
    /// expected shape.
    #[error("malformed response from {context}: {message}")]
    MalformedResponse { context: String, message: String },

    /// Validation was attempted without a prior successful provisioning run.
    #[error("no provision record at {}; run `marquee provision` first", path.display())]
    MissingLocalRecord { path: PathBuf },

    /// Writing or reading the provision record failed at the filesystem level.
    #[error("failed to persist provision record: {0}")]
    Persist(#[from] std::io::Error),
}

impl SetupError {
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// HTTP status of a `RemoteRejection`, if that is what this error is.
    pub fn rejection_status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }
}
