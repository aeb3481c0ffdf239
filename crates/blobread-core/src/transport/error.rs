//! Transport failure type shared by all blob stores.

use std::io;

/// Failure reported by a blob store client or one of its channels.
///
/// `ObjectMissing` is the only variant that says anything about the blob
/// itself; everything else is a transport problem that may go away on retry.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The store reported that the object does not exist.
    #[error("object missing: {0}")]
    ObjectMissing(String),
    /// HTTP response had an unexpected status.
    #[error("HTTP {status}")]
    Http { status: u32 },
    /// Curl reported an error (timeout, connection, etc.).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Response body ended before the advertised or requested length.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// A 206 response whose Content-Range does not start at the requested
    /// offset, or has no Content-Range at all.
    #[error("range mismatch: requested bytes from {requested}, served {served:?}")]
    RangeMismatch { requested: u64, served: Option<u64> },
    /// Operation on a channel that was already closed.
    #[error("channel is closed")]
    Closed,
}

impl TransportError {
    pub fn is_object_missing(&self) -> bool {
        matches!(self, TransportError::ObjectMissing(_))
    }
}
