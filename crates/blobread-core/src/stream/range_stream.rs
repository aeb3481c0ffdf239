//! Retrying, resuming sequential read over a byte range of a blob.

use super::source::{BoundedByteSource, ByteSource, SourceError};
use crate::locator::BlobLocator;
use crate::range::ByteRange;
use crate::retry::{
    classify, FailureRecord, MisuseKind, ReadError, RetryBudget, RetryDecision,
    SuppressedFailures,
};
use crate::transport::{BlobStoreClient, PassThrough, PrivilegedExecutor, RawChannel};
use std::io;
use std::mem;

/// Externally visible phase of a read session.
///
/// Reopening is internal: every public call returns with a source in place
/// or the session in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Reading,
    FailedNotFound,
    FailedExhausted,
    Closed,
}

enum State<Ch: RawChannel, X: PrivilegedExecutor> {
    Reading(BoundedByteSource<Ch, X>),
    /// The previous source is gone; the next read opens a new one.
    Reopening,
    FailedNotFound,
    FailedExhausted,
    Closed,
}

/// Forward-only stream over `range` of one blob.
///
/// Transport failures in the middle of a transfer are retried by reopening
/// the blob at `range.start() + offset()`, so every byte is delivered exactly
/// once. At most `max_retries() - 1` reopens happen; a missing blob ends the
/// session at once.
pub struct RangeStream<'a, C, X = PassThrough>
where
    C: BlobStoreClient,
    X: PrivilegedExecutor + Clone,
{
    client: &'a C,
    executor: X,
    locator: BlobLocator,
    range: ByteRange,
    budget: RetryBudget,
    attempt: u32,
    /// Bytes handed to the caller, relative to `range.start()`.
    offset: u64,
    state: State<C::Channel, X>,
    suppressed: SuppressedFailures,
}

impl<'a, C: BlobStoreClient> RangeStream<'a, C, PassThrough> {
    /// Opens a session and its first source. A missing blob is reported here,
    /// before any byte is read.
    pub fn open(client: &'a C, locator: BlobLocator, range: ByteRange) -> Result<Self, ReadError> {
        Self::open_with(client, locator, range, PassThrough)
    }
}

impl<'a, C, X> RangeStream<'a, C, X>
where
    C: BlobStoreClient,
    X: PrivilegedExecutor + Clone,
{
    /// Like [`RangeStream::open`], routing every channel operation through `executor`.
    pub fn open_with(
        client: &'a C,
        locator: BlobLocator,
        range: ByteRange,
        executor: X,
    ) -> Result<Self, ReadError> {
        let budget = RetryBudget::from_transport_attempts(client.max_transport_attempts());
        let mut stream = Self {
            client,
            executor,
            locator,
            range,
            budget,
            attempt: 1,
            offset: 0,
            state: State::Reopening,
            suppressed: SuppressedFailures::new(),
        };
        stream.ensure_source()?;
        Ok(stream)
    }

    pub fn locator(&self) -> &BlobLocator {
        &self.locator
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    /// Current attempt, starting at 1 and bumped on every reopen.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Bytes delivered so far, relative to the range start.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn max_retries(&self) -> u32 {
        self.budget.max_retries()
    }

    /// Retryable failures seen so far, oldest first.
    pub fn suppressed(&self) -> &SuppressedFailures {
        &self.suppressed
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Reading(_) | State::Reopening => SessionState::Reading,
            State::FailedNotFound => SessionState::FailedNotFound,
            State::FailedExhausted => SessionState::FailedExhausted,
            State::Closed => SessionState::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Reads one byte; `None` at end of range.
    pub fn read_byte(&mut self) -> Result<Option<u8>, ReadError> {
        let mut byte = [0u8; 1];
        match self.read_into(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Reads up to `buf.len()` bytes. `Ok(0)` means end of range, unless `buf`
    /// is empty.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        self.check_usable()?;
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            self.ensure_source()?;
            let failure = match &mut self.state {
                State::Reading(source) => match source.read(buf) {
                    Ok(n) => {
                        self.offset += n as u64;
                        return Ok(n);
                    }
                    Err(e) => e,
                },
                _ => continue,
            };
            self.on_failure(failure)?;
        }
    }

    /// Always fails: the stream is forward-only.
    pub fn skip(&mut self, _n: u64) -> Result<u64, ReadError> {
        Err(ReadError::Misuse(MisuseKind::Skip))
    }

    /// Always fails: the stream is forward-only.
    pub fn reset(&mut self) -> Result<(), ReadError> {
        Err(ReadError::Misuse(MisuseKind::Reset))
    }

    /// Releases the current source. Idempotent; errors from the channel are
    /// discarded. Later reads fail with [`MisuseKind::ReadAfterClose`].
    pub fn close(&mut self) {
        self.release(State::Closed);
    }

    fn check_usable(&self) -> Result<(), ReadError> {
        match self.state {
            State::Reading(_) | State::Reopening => Ok(()),
            State::Closed => Err(ReadError::Misuse(MisuseKind::ReadAfterClose)),
            State::FailedNotFound | State::FailedExhausted => {
                Err(ReadError::Misuse(MisuseKind::ReadAfterFailure))
            }
        }
    }

    /// Opens sources until one succeeds or the session fails for good.
    fn ensure_source(&mut self) -> Result<(), ReadError> {
        while matches!(self.state, State::Reopening) {
            match BoundedByteSource::open(
                self.client,
                &self.locator,
                self.range,
                self.offset,
                self.executor.clone(),
            ) {
                Ok(source) => self.state = State::Reading(source),
                Err(e) => self.on_failure(e)?,
            }
        }
        self.check_usable()
    }

    fn on_failure(&mut self, error: SourceError) -> Result<(), ReadError> {
        match self.budget.decide(self.attempt, classify(&error)) {
            RetryDecision::Reopen => {
                tracing::debug!(
                    blob = %self.locator,
                    offset = self.offset,
                    attempt = self.attempt,
                    max_retries = self.budget.max_retries(),
                    "failed reading blob, retrying: {}",
                    error
                );
                self.suppressed.push(FailureRecord {
                    error,
                    offset: self.offset,
                    attempt: self.attempt,
                });
                self.attempt += 1;
                self.release(State::Reopening);
                Ok(())
            }
            RetryDecision::NotFound => {
                self.release(State::FailedNotFound);
                Err(ReadError::NotFound {
                    locator: self.locator.clone(),
                    cause: error,
                    suppressed: mem::take(&mut self.suppressed),
                })
            }
            RetryDecision::Exhausted => {
                self.release(State::FailedExhausted);
                Err(ReadError::RetryBudgetExhausted {
                    locator: self.locator.clone(),
                    offset: self.offset,
                    attempts: self.attempt,
                    last: error,
                    suppressed: mem::take(&mut self.suppressed),
                })
            }
            RetryDecision::Misuse => {
                self.release(State::Closed);
                Err(ReadError::Misuse(MisuseKind::ChannelClosed))
            }
        }
    }

    /// Moves to `next`, closing the current source if there is one.
    fn release(&mut self, next: State<C::Channel, X>) {
        if let State::Reading(mut source) = mem::replace(&mut self.state, next) {
            if let Err(e) = source.close() {
                tracing::trace!(blob = %self.locator, "discarded error closing source: {}", e);
            }
        }
    }
}

impl<'a, C, X> io::Read for RangeStream<'a, C, X>
where
    C: BlobStoreClient,
    X: PrivilegedExecutor + Clone,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_into(buf).map_err(io::Error::from)
    }
}
