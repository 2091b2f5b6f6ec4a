//! Byte-offset spans.
//!
//! Hosts describe declaration parts, existing members and hidden regions as
//! byte ranges into the document text. All ranges are half-open: `start` is
//! inclusive, `end` is exclusive.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteSpan {
    pub start: u32,
    pub end: u32,
}

impl ByteSpan {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        ByteSpan { start, end }
    }

    /// A zero-length span at `offset`.
    #[inline]
    pub const fn at(offset: u32) -> Self {
        ByteSpan {
            start: offset,
            end: offset,
        }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub const fn contains(self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// True when the two spans share at least one offset, or when an empty
    /// span sits strictly inside the other one.
    pub const fn overlaps(self, other: ByteSpan) -> bool {
        if self.is_empty() {
            return other.start < self.start && self.start < other.end;
        }
        if other.is_empty() {
            return self.start < other.start && other.start < self.end;
        }
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
#[path = "tests/span_tests.rs"]
mod tests;
