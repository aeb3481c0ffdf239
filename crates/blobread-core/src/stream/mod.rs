//! Sequential range reads that survive transport failures.
//!
//! [`RangeStream`] owns one [`BoundedByteSource`] at a time and swaps it for a
//! fresh one, positioned at the last delivered byte, whenever a retryable
//! failure occurs.

mod range_stream;
mod source;

pub use range_stream::{RangeStream, SessionState};
pub use source::{BoundedByteSource, ByteSource, SourceError};
