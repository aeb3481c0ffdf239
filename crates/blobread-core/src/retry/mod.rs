//! Retry policy for read sessions.
//!
//! Failure classification (missing object vs. transient transport trouble vs.
//! caller misuse), the per-session retry budget, the bounded history of
//! suppressed failures, and the errors that leave a session.

mod classify;
mod error;
mod policy;
mod suppressed;

pub use classify::{classify, classify_transport, Classification};
pub use error::{MisuseKind, ReadError};
pub use policy::{RetryBudget, RetryDecision};
pub use suppressed::{FailureRecord, SuppressedFailures, MAX_SUPPRESSED_FAILURES};
