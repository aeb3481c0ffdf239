//! Classify source failures for retry decisions.

use crate::stream::SourceError;
use crate::transport::TransportError;

/// How a failure from a byte source must be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The blob does not exist. Terminal, never retried.
    NotFound,
    /// Transport trouble that a reopen may cure.
    Retryable,
    /// The channel was used after it was closed; a programming error.
    Misuse,
}

/// Classify a transport failure.
pub fn classify_transport(e: &TransportError) -> Classification {
    match e {
        TransportError::ObjectMissing(_) => Classification::NotFound,
        TransportError::Closed => Classification::Misuse,
        TransportError::Http { .. }
        | TransportError::Curl(_)
        | TransportError::Io(_)
        | TransportError::PartialTransfer { .. }
        | TransportError::RangeMismatch { .. } => Classification::Retryable,
    }
}

/// Classify a byte source failure.
pub fn classify(e: &SourceError) -> Classification {
    match e {
        SourceError::NotFound { .. } => Classification::NotFound,
        SourceError::Transport(te) => classify_transport(te),
    }
}
