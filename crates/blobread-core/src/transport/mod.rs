//! Blob store collaborators.
//!
//! The read stream only depends on the two traits here: a client that opens
//! read channels and reports its transport retry budget, and the channel
//! itself. Concrete stores live in submodules.

mod error;
pub mod fs;
pub mod http;
mod privileged;

pub use error::TransportError;
pub use fs::FsBlobStore;
pub use http::HttpBlobStore;
pub use privileged::{PassThrough, PrivilegedExecutor};

use crate::locator::BlobLocator;

/// Fetch chunk size used by channels unless told otherwise.
pub const DEFAULT_FETCH_CHUNK_SIZE: usize = 2 * 1024 * 1024;

/// A client able to open read channels on blobs.
pub trait BlobStoreClient {
    type Channel: RawChannel;

    /// Opens a fresh channel positioned at offset 0.
    fn open_read_channel(&self, locator: &BlobLocator) -> Result<Self::Channel, TransportError>;

    /// Number of attempts the transport itself is configured to make.
    fn max_transport_attempts(&self) -> u32;
}

/// A remote read channel that fetches the blob in chunks.
///
/// A single `fetch` may request `max(chunk size, buf.len())` bytes from the
/// remote end, so callers that know how much they need should shrink the
/// chunk size first.
pub trait RawChannel {
    /// Moves the next fetch to `offset` (absolute within the blob).
    fn seek(&mut self, offset: u64) -> Result<(), TransportError>;

    /// Sets the remote fetch size. `0` restores the channel default.
    fn set_fetch_chunk_size(&mut self, size: usize);

    fn default_fetch_chunk_size(&self) -> usize;

    /// Reads into `buf`. `Ok(0)` for a non-empty `buf` means end of blob.
    fn fetch(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    fn is_open(&self) -> bool;

    fn close(&mut self) -> Result<(), TransportError>;
}
