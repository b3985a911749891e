//! Compared units.
//!
//! Every differ in [`crate::algo`] is generic over [`DiffElement`]: two
//! elements are equal exactly when their keys are equal. Hash collisions are
//! accepted; at line and word level they are 64-bit and at char level they
//! only narrow a highlight.

/// Anything the differs can compare.
pub trait DiffElement {
    /// Equality key.
    fn key(&self) -> u64;
}

impl DiffElement for u64 {
    #[inline]
    fn key(&self) -> u64 {
        *self
    }
}

impl DiffElement for u32 {
    #[inline]
    fn key(&self) -> u64 {
        u64::from(*self)
    }
}

impl DiffElement for char {
    #[inline]
    fn key(&self) -> u64 {
        u64::from(u32::from(*self))
    }
}

/// One logical line of a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineElem {
    /// Line number in the host document
    pub doc_line: u32,
    /// Hash of the retained code units
    pub hash: u64,
    /// No code units were retained (EOL excluded)
    pub blank: bool,
}

impl DiffElement for LineElem {
    #[inline]
    fn key(&self) -> u64 {
        self.hash
    }
}

/// A maximal run of one character class inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordElem {
    /// Logical line owning the word
    pub line_index: u32,
    /// Byte offset from the start of the line
    pub byte_off: u32,
    /// Byte length of the run
    pub byte_len: u32,
    pub hash: u64,
}

impl WordElem {
    /// One past the last byte.
    #[inline]
    pub fn byte_end(&self) -> u32 {
        self.byte_off + self.byte_len
    }
}

impl DiffElement for WordElem {
    #[inline]
    fn key(&self) -> u64 {
        self.hash
    }
}

/// A single character (or a collapsed whitespace run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharElem {
    /// Byte offset from the start of the line
    pub byte_pos: u32,
    pub byte_len: u32,
    /// The folded scalar value
    pub hash: u32,
}

impl CharElem {
    #[inline]
    pub fn byte_end(&self) -> u32 {
        self.byte_pos + self.byte_len
    }
}

impl DiffElement for CharElem {
    #[inline]
    fn key(&self) -> u64 {
        u64::from(self.hash)
    }
}
