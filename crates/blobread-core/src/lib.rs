//! Resumable range reads over remote blob stores.
//!
//! Open a [`RangeStream`] with a [`BlobStoreClient`], a [`BlobLocator`] and a
//! [`ByteRange`]; read it like any `std::io::Read`. Mid-transfer failures are
//! retried from the last delivered byte within a fixed budget.

pub mod checksum;
pub mod config;
pub mod locator;
pub mod logging;
pub mod range;
pub mod retry;
pub mod stream;
pub mod transport;

pub use locator::BlobLocator;
pub use range::ByteRange;
pub use retry::{MisuseKind, ReadError};
pub use stream::{RangeStream, SessionState};
pub use transport::{BlobStoreClient, PrivilegedExecutor, RawChannel};
