//! Error types shared across intake services.
//!
//! These errors represent failures in storage components (JSON array files, rendered
//! documents) that any intake service relies on. Application-specific errors should be
//! defined in each service crate and wrap `CommonError` via `#[from]`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store {0} finished without producing a snapshot")]
    NoSnapshot(String),
}

impl CommonError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
