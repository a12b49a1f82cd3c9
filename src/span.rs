//! Byte-offset spans into the original utterance.
//!
//! A [`Span`] is the single unit of provenance threaded through every
//! structure this crate produces. Spans are half-open `[start, end)` byte
//! ranges into the source string, always cut on `char` boundaries, so
//! `&source[span.start..span.end]` reproduces the exact original text.
//!
//! Spans are never fabricated after the fact: every fragment's span is the
//! covering union of the spans of the tokens it consumed.

use serde::{Deserialize, Serialize};

/// A half-open byte-offset range into the original source string.
///
/// Invariant: `start <= end`, and both offsets lie on `char` boundaries of
/// the source the span was produced from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Inclusive start byte offset
    pub start: usize,
    /// Exclusive end byte offset
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the span covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice the original source with this span.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The smallest span covering every span in the slice.
    ///
    /// Returns `None` for an empty slice; a covering span is only meaningful
    /// when there is at least one consumed token to derive it from.
    pub fn cover(spans: &[Span]) -> Option<Span> {
        let mut iter = spans.iter().copied();
        let first = iter.next()?;
        Some(iter.fold(first, Span::union))
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two spans share no gap (`self` ends where `other` starts).
    pub fn adjoins(&self, other: &Span) -> bool {
        self.end == other.start
    }
}
