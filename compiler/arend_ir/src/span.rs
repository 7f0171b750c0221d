//! Source location spans.
//!
//! Byte offsets into a single module's source text. Spans are plain values;
//! the module they belong to is carried separately (see `Anchor` in
//! `arend_diagnostic`).

use std::fmt;

/// Half-open byte range `[start, end)` in a module's source text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for generated nodes that have no source text.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range, saturating offsets that do not fit in `u32`.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Span { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if an offset is within this span.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Move the span by a signed byte delta.
    ///
    /// Used to re-anchor diagnostics of a definition whose text moved without
    /// changing.
    #[inline]
    #[must_use]
    pub fn shifted(self, delta: i64) -> Span {
        let shift = |offset: u32| -> u32 {
            let moved = i64::from(offset) + delta;
            u32::try_from(moved.max(0)).unwrap_or(u32::MAX)
        };
        Span {
            start: shift(self.start),
            end: shift(self.end),
        }
    }

    #[inline]
    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Slice the given source text, returning `""` for out-of-range spans.
    pub fn slice(self, text: &str) -> &str {
        text.get(self.to_range()).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::from_range(range)
    }
}

#[cfg(test)]
mod tests;
