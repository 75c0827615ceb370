//! Error types for remote disk transfers.

use std::io;

use thiserror::Error;

/// Result type for transfer and service operations.
pub type RctResult<T> = Result<T, RctError>;

/// Errors that can occur while talking to the RCT service or writing a disk image.
#[derive(Debug, Error)]
pub enum RctError {
    /// A service call failed: transport error, non-success status or an
    /// unreadable response body.
    #[error("request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// A checkpoint was requested but change tracking is off for the disk.
    #[error("RCT not enabled for disk {disk_path}")]
    TrackingDisabled { disk_path: String },

    /// The content stream for a batch delivered the wrong number of bytes.
    #[error("incomplete response: bytes expected {expected}, received {received}")]
    IncompleteStream { expected: u64, received: u64 },

    /// Failed to seek or write the output extent.
    #[error("failed to write output at offset {offset}: {source}")]
    WriteFailed {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// Failed to size the output extent to the virtual disk.
    #[error("failed to resize output to {len} bytes: {source}")]
    ResizeFailed {
        len: u64,
        #[source]
        source: io::Error,
    },

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RctError {
    /// Shorthand for a [`RctError::RequestFailed`].
    pub fn request_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::RequestFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
