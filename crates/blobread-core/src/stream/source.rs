//! One remote channel adapted into a byte source clamped to a range.

use crate::locator::BlobLocator;
use crate::range::ByteRange;
use crate::transport::{BlobStoreClient, PrivilegedExecutor, RawChannel, TransportError};

/// Failure of a byte source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The store reported the blob missing, on open or on a fetch.
    #[error("blob object [{locator}] not found: {detail}")]
    NotFound { locator: BlobLocator, detail: String },
    #[error(transparent)]
    Transport(TransportError),
}

impl SourceError {
    fn from_transport(locator: &BlobLocator, e: TransportError) -> Self {
        match e {
            TransportError::ObjectMissing(detail) => SourceError::NotFound {
                locator: locator.clone(),
                detail,
            },
            other => SourceError::Transport(other),
        }
    }
}

/// Sequential byte source: the one capability a read session needs.
pub trait ByteSource {
    /// Reads into `buf`; `Ok(0)` for a non-empty `buf` means end of range.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;

    fn is_open(&self) -> bool;

    fn close(&mut self) -> Result<(), SourceError>;
}

/// Channel wrapper that never reads past the end of its range.
///
/// Channels fetch `max(chunk size, buf.len())` bytes per request, so near the
/// end of the range the chunk size is shrunk to what is left and put back to
/// the default after every fetch.
pub struct BoundedByteSource<Ch: RawChannel, X: PrivilegedExecutor> {
    channel: Ch,
    executor: X,
    locator: BlobLocator,
    range: ByteRange,
    /// Absolute offset of the next byte.
    position: u64,
    closed: bool,
}

impl<Ch: RawChannel, X: PrivilegedExecutor> BoundedByteSource<Ch, X> {
    /// Opens a fresh channel positioned `resume_offset` bytes into `range`.
    pub fn open<C>(
        client: &C,
        locator: &BlobLocator,
        range: ByteRange,
        resume_offset: u64,
        executor: X,
    ) -> Result<Self, SourceError>
    where
        C: BlobStoreClient<Channel = Ch>,
    {
        let channel = executor
            .run(|| client.open_read_channel(locator))
            .map_err(|e| SourceError::from_transport(locator, e))?;
        let mut source = Self {
            channel,
            executor,
            locator: locator.clone(),
            range,
            position: 0,
            closed: false,
        };
        if resume_offset > 0 || range.start() > 0 {
            source.seek(range.absolute(resume_offset))?;
        }
        Ok(source)
    }

    fn seek(&mut self, offset: u64) -> Result<(), SourceError> {
        let channel = &mut self.channel;
        self.executor
            .run(|| channel.seek(offset))
            .map_err(|e| SourceError::from_transport(&self.locator, e))?;
        self.position = offset;
        Ok(())
    }

    /// Absolute offset of the next byte this source will return.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining(&self) -> u64 {
        self.range.remaining_from(self.position)
    }
}

impl<Ch: RawChannel, X: PrivilegedExecutor> ByteSource for BoundedByteSource<Ch, X> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.closed {
            return Err(SourceError::Transport(TransportError::Closed));
        }
        let remaining = self.remaining();
        if buf.is_empty() || remaining == 0 {
            return Ok(0);
        }

        if remaining < self.channel.default_fetch_chunk_size() as u64 {
            // Fits in usize: smaller than a usize chunk size.
            self.channel.set_fetch_chunk_size(remaining as usize);
        }
        let len = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let dst = &mut buf[..len];

        let channel = &mut self.channel;
        let fetched = self.executor.run(|| channel.fetch(dst));
        self.channel.set_fetch_chunk_size(0);

        let n = fetched.map_err(|e| SourceError::from_transport(&self.locator, e))?;
        self.position += n as u64;
        Ok(n)
    }

    fn is_open(&self) -> bool {
        !self.closed && self.channel.is_open()
    }

    /// Closes the channel. The source counts as closed even if this fails.
    fn close(&mut self) -> Result<(), SourceError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let channel = &mut self.channel;
        self.executor
            .run(|| channel.close())
            .map_err(SourceError::Transport)
    }
}

impl<Ch: RawChannel, X: PrivilegedExecutor> Drop for BoundedByteSource<Ch, X> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
