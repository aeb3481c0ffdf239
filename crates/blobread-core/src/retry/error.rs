//! Errors that cross the read-session boundary.

use super::{FailureRecord, SuppressedFailures};
use crate::locator::BlobLocator;
use crate::stream::SourceError;
use std::fmt;
use std::io;

/// Caller programming errors. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MisuseKind {
    /// Read after `close()`.
    ReadAfterClose,
    /// Read after the session already failed with a terminal error.
    ReadAfterFailure,
    /// `skip()` is unsupported: the stream is forward-only.
    Skip,
    /// `reset()` is unsupported: the stream is forward-only.
    Reset,
    /// The underlying channel was used after it had been closed.
    ChannelClosed,
}

impl fmt::Display for MisuseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MisuseKind::ReadAfterClose => write!(f, "read after close"),
            MisuseKind::ReadAfterFailure => write!(f, "read after terminal failure"),
            MisuseKind::Skip => write!(f, "range streams do not support skip"),
            MisuseKind::Reset => write!(f, "range streams do not support reset"),
            MisuseKind::ChannelClosed => write!(f, "read channel used after close"),
        }
    }
}

/// Terminal outcome of a read session.
///
/// Transient transport failures never surface directly: they are retried,
/// and only show up as `suppressed` history on one of these.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The blob does not exist (at open or at any later fetch).
    #[error("blob [{locator}] not found")]
    NotFound {
        locator: BlobLocator,
        #[source]
        cause: SourceError,
        suppressed: SuppressedFailures,
    },
    /// Every attempt of the retry budget failed.
    #[error("failed reading blob [{locator}] at offset [{offset}] after [{attempts}] attempts")]
    RetryBudgetExhausted {
        locator: BlobLocator,
        offset: u64,
        attempts: u32,
        /// The failure of the final attempt.
        #[source]
        last: SourceError,
        suppressed: SuppressedFailures,
    },
    #[error("misuse: {0}")]
    Misuse(MisuseKind),
}

impl ReadError {
    /// Earlier retryable failures, oldest first. Empty for misuse.
    pub fn suppressed(&self) -> &[FailureRecord] {
        match self {
            ReadError::NotFound { suppressed, .. }
            | ReadError::RetryBudgetExhausted { suppressed, .. } => suppressed.as_slice(),
            ReadError::Misuse(_) => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound { .. })
    }

    pub fn is_misuse(&self) -> bool {
        matches!(self, ReadError::Misuse(_))
    }
}

impl From<ReadError> for io::Error {
    fn from(e: ReadError) -> Self {
        let kind = match &e {
            ReadError::NotFound { .. } => io::ErrorKind::NotFound,
            ReadError::Misuse(_) => io::ErrorKind::InvalidInput,
            ReadError::RetryBudgetExhausted { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
