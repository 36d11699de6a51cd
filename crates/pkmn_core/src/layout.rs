use serde::{Deserialize, Serialize};

/// Half-open byte range `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering `first..=last`, the way offset tables are usually written.
    pub const fn inclusive(first: usize, last: usize) -> Self {
        Self {
            start: first,
            end: last + 1,
        }
    }

    pub const fn rebased(self, base: usize) -> Self {
        Self {
            start: base + self.start,
            end: base + self.end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumWidth {
    /// 8-bit complement of the byte sum (Generation 1).
    Complement8,
    /// Low 16 bits of the byte sum, stored little-endian (Generation 2).
    Sum16,
}

/// How to checksum one region: which bytes to sum and where the result lives.
///
/// Ranges and the stored offset are relative to `base`, so one literal table
/// can describe several identically shaped banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumSpec {
    pub width: ChecksumWidth,
    pub base: usize,
    pub ranges: &'static [ByteRange],
    pub stored_at: usize,
}

impl ChecksumSpec {
    pub const fn new(
        width: ChecksumWidth,
        base: usize,
        ranges: &'static [ByteRange],
        stored_at: usize,
    ) -> Self {
        Self {
            width,
            base,
            ranges,
            stored_at,
        }
    }

    pub fn location(&self) -> usize {
        self.base + self.stored_at
    }

    pub fn absolute_ranges(&self) -> impl Iterator<Item = ByteRange> + '_ {
        self.ranges.iter().map(move |r| r.rebased(self.base))
    }
}
