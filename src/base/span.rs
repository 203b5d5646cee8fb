//! Byte positions and spans inside Go source files.
//!
//! Graph output records spans as a `[start, end]` pair of byte offsets,
//! so [`Span`] serializes exactly that way. Everything upstream works in
//! `text-size` ranges and converts at the edge.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use text_size::TextRange;
pub use text_size::TextSize;

use super::FileId;

/// A byte position inside one file.
///
/// Object positions (where an identifier was declared) are stored as a
/// `Pos`. The offset is what the `$<file><offset>` uniquifiers are built
/// from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Pos {
    pub file: FileId,
    pub offset: TextSize,
}

impl Pos {
    #[inline]
    pub const fn new(file: FileId, offset: TextSize) -> Self {
        Self { file, offset }
    }

    /// The raw byte offset.
    #[inline]
    pub fn byte(self) -> u32 {
        self.offset.into()
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.file, u32::from(self.offset))
    }
}

/// A half-open `[start, end)` byte span, serialized as a two-element array.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl From<TextRange> for Span {
    #[inline]
    fn from(range: TextRange) -> Self {
        Self::new(range.start().into(), range.end().into())
    }
}

impl From<[u32; 2]> for Span {
    #[inline]
    fn from([start, end]: [u32; 2]) -> Self {
        Self::new(start, end)
    }
}

impl From<Span> for [u32; 2] {
    #[inline]
    fn from(span: Span) -> Self {
        [span.start, span.end]
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
