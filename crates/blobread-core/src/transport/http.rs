//! HTTP blob store over libcurl.
//!
//! Blobs live at `<endpoint>/<container>/<name>`. Opening a channel probes
//! the blob with HEAD so a missing object is reported before any byte is
//! read; each fetch is one ranged GET of a full chunk, buffered in memory.

use super::{BlobStoreClient, RawChannel, TransportError, DEFAULT_FETCH_CHUNK_SIZE};
use crate::config::BlobReadConfig;
use crate::locator::BlobLocator;
use crate::range::http_range_value;
use curl::easy::Easy;
use std::str;
use std::time::Duration;
use url::Url;

/// Curl timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    /// Abort if throughput stays below this many bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    endpoint: Url,
    max_attempts: u32,
    chunk_size: usize,
    timeouts: HttpTimeouts,
}

impl HttpBlobStore {
    /// Store rooted at `endpoint` (e.g. `http://127.0.0.1:9000/`).
    pub fn new(endpoint: &str, max_attempts: u32) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            endpoint,
            max_attempts,
            chunk_size: DEFAULT_FETCH_CHUNK_SIZE,
            timeouts: HttpTimeouts::default(),
        })
    }

    /// Store configured from the `[transport]` section and `fetch_chunk_size`.
    pub fn from_config(endpoint: &str, cfg: &BlobReadConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(endpoint, cfg.transport.max_attempts)?
            .with_fetch_chunk_size(cfg.fetch_chunk_size)
            .with_timeouts(cfg.transport.timeouts()))
    }

    pub fn with_fetch_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn with_timeouts(mut self, timeouts: HttpTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Full URL of a blob; path segments are percent-encoded.
    pub fn blob_url(&self, locator: &BlobLocator) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(locator.container())
                .extend(locator.name().split('/'));
        }
        url
    }
}

impl BlobStoreClient for HttpBlobStore {
    type Channel = HttpChannel;

    fn open_read_channel(&self, locator: &BlobLocator) -> Result<HttpChannel, TransportError> {
        let url = self.blob_url(locator).to_string();

        let mut easy = new_easy(&url, &self.timeouts)?;
        easy.nobody(true)?;
        easy.perform()?;
        match easy.response_code()? {
            404 => return Err(TransportError::ObjectMissing(url)),
            200..=299 => {}
            status => return Err(TransportError::Http { status }),
        }

        Ok(HttpChannel {
            url,
            timeouts: self.timeouts,
            default_chunk_size: self.chunk_size,
            chunk_size: self.chunk_size,
            position: 0,
            buffer: Vec::new(),
            cursor: 0,
            at_end: false,
            open: true,
        })
    }

    fn max_transport_attempts(&self) -> u32 {
        self.max_attempts
    }
}

fn new_easy(url: &str, timeouts: &HttpTimeouts) -> Result<Easy, curl::Error> {
    let mut easy = Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.low_speed_limit(timeouts.low_speed_limit)?;
    easy.low_speed_time(timeouts.low_speed_time)?;
    Ok(easy)
}

/// Read channel over one blob URL.
#[derive(Debug)]
pub struct HttpChannel {
    url: String,
    timeouts: HttpTimeouts,
    default_chunk_size: usize,
    chunk_size: usize,
    /// Absolute offset of the next byte to request from the server.
    position: u64,
    buffer: Vec<u8>,
    cursor: usize,
    at_end: bool,
    open: bool,
}

impl HttpChannel {
    /// Issues one ranged GET of `max(chunk size, min_len)` bytes and replaces
    /// the buffer with its body.
    fn fill(&mut self, min_len: usize) -> Result<(), TransportError> {
        let want = self.chunk_size.max(min_len) as u64;
        let (status, content_range, mut body) = self.get_range(self.position, want)?;

        match status {
            206 => {
                let (first, last) = match content_range {
                    Some((first, last, _)) if first == self.position => (first, last),
                    other => {
                        return Err(TransportError::RangeMismatch {
                            requested: self.position,
                            served: other.map(|(first, _, _)| first),
                        })
                    }
                };
                let expected = last.saturating_sub(first) + 1;
                if (body.len() as u64) < expected {
                    return Err(TransportError::PartialTransfer {
                        expected,
                        received: body.len() as u64,
                    });
                }
            }
            // Range ignored: the full object came back.
            200 => {
                let skip = usize::try_from(self.position)
                    .unwrap_or(usize::MAX)
                    .min(body.len());
                body.drain(..skip);
                body.truncate(usize::try_from(want).unwrap_or(usize::MAX));
            }
            404 => return Err(TransportError::ObjectMissing(self.url.clone())),
            416 => {
                self.at_end = true;
                self.buffer.clear();
                self.cursor = 0;
                return Ok(());
            }
            status => return Err(TransportError::Http { status }),
        }

        let received = body.len() as u64;
        let total = content_range.and_then(|(_, _, total)| total);
        self.at_end = received < want
            || total.is_some_and(|t| self.position.saturating_add(received) >= t);
        self.position += received;
        self.buffer = body;
        self.cursor = 0;
        Ok(())
    }

    fn get_range(
        &self,
        from: u64,
        len: u64,
    ) -> Result<(u32, Option<(u64, u64, Option<u64>)>, Vec<u8>), TransportError> {
        let mut body = Vec::new();
        let mut content_range = None;

        let mut easy = new_easy(&self.url, &self.timeouts)?;
        let mut headers = curl::easy::List::new();
        headers.append(&format!("Range: {}", http_range_value(from, len)))?;
        easy.http_headers(headers)?;
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Ok(s) = str::from_utf8(line) {
                    if let Some(parsed) = parse_content_range(s) {
                        content_range = Some(parsed);
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let status = easy.response_code()?;
        Ok((status, content_range, body))
    }
}

impl RawChannel for HttpChannel {
    fn seek(&mut self, offset: u64) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.position = offset;
        self.buffer.clear();
        self.cursor = 0;
        self.at_end = false;
        Ok(())
    }

    fn set_fetch_chunk_size(&mut self, size: usize) {
        self.chunk_size = if size == 0 {
            self.default_chunk_size
        } else {
            size
        };
    }

    fn default_fetch_chunk_size(&self) -> usize {
        self.default_chunk_size
    }

    fn fetch(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if self.cursor >= self.buffer.len() {
            if self.at_end {
                return Ok(0);
            }
            self.fill(buf.len())?;
        }
        let available = &self.buffer[self.cursor..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.cursor += n;
        Ok(n)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        self.buffer = Vec::new();
        self.cursor = 0;
        Ok(())
    }
}

/// Parses `Content-Range: bytes first-last/total` (total may be `*`).
fn parse_content_range(line: &str) -> Option<(u64, u64, Option<u64>)> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-range") {
        return None;
    }
    let spec = value.trim().strip_prefix("bytes")?.trim_start();
    let (span, total) = spec.split_once('/')?;
    let (first, last) = span.split_once('-')?;
    let first = first.trim().parse().ok()?;
    let last = last.trim().parse().ok()?;
    let total = total.trim().parse().ok();
    Some((first, last, total))
}
