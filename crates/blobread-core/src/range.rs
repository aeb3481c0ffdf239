//! Byte range math for a single read session.

/// Sentinel end offset for ranges that extend to the object's natural end.
pub const UNBOUNDED_END: u64 = u64::MAX;

/// A window over a blob: `[start, start + length)` (half-open), or
/// `[start, natural end)` when the length is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start offset (inclusive).
    start: u64,
    /// Length in bytes; `None` reads to the end of the object.
    length: Option<u64>,
}

impl ByteRange {
    /// Bounded range of `length` bytes starting at `start`.
    pub fn new(start: u64, length: u64) -> Self {
        Self {
            start,
            length: Some(length),
        }
    }

    /// Range from `start` to the end of the object.
    pub fn unbounded(start: u64) -> Self {
        Self {
            start,
            length: None,
        }
    }

    /// Builds a range from a signed length; a negative length means unbounded.
    pub fn from_signed(start: u64, length: i64) -> Self {
        match u64::try_from(length) {
            Ok(len) => Self::new(start, len),
            Err(_) => Self::unbounded(start),
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// End offset (exclusive). Unbounded ranges, and bounded ones whose end
    /// would overflow, end at [`UNBOUNDED_END`].
    pub fn end(&self) -> u64 {
        match self.length {
            Some(len) => self.start.checked_add(len).unwrap_or(UNBOUNDED_END),
            None => UNBOUNDED_END,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.end() == UNBOUNDED_END
    }

    /// True for a bounded range of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.length == Some(0)
    }

    /// Absolute offset of the byte `relative` bytes into this range.
    /// Saturates at [`UNBOUNDED_END`].
    pub fn absolute(&self, relative: u64) -> u64 {
        self.start.saturating_add(relative)
    }

    /// Bytes left between absolute offset `position` and the end of the range.
    pub fn remaining_from(&self, position: u64) -> u64 {
        self.end().saturating_sub(position)
    }
}

/// HTTP Range header value (inclusive end) for `len` bytes at `from`:
/// `bytes=from-(from+len-1)`, or open-ended `bytes=from-` when the end
/// does not fit.
pub fn http_range_value(from: u64, len: u64) -> String {
    match from.checked_add(len) {
        Some(end) if len > 0 && end < UNBOUNDED_END => format!("bytes={}-{}", from, end - 1),
        _ => format!("bytes={}-", from),
    }
}
