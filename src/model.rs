//! Result data model shared by the pipeline stages.
//!
//! Line indices in [`DiffBlock`] and [`ChangedLine::idx`] are *logical*:
//! positions in the filtered line sequence of a side. Anything a host renders
//! ([`AlignSide::line`], [`ChangedLine::line`]) is a document line number.

use smallvec::SmallVec;

use crate::emit::MarkerMask;
use crate::options::Side;

// =============================================================================
// Ranges
// =============================================================================

/// Half-open index range `[s, e)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub s: usize,
    pub e: usize,
}

impl Range {
    #[inline]
    pub const fn new(s: usize, e: usize) -> Self {
        Self { s, e }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.e - self.s
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.e <= self.s
    }

    #[inline]
    pub const fn contains(&self, i: usize) -> bool {
        self.s <= i && i < self.e
    }
}

/// A run of lines inside one block found verbatim inside another block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRange {
    /// Logical lines on this side
    pub range: Range,
    /// Block holding the mirror range
    pub peer_block: usize,
    /// First logical line of the mirror range on the other side
    pub peer_start: usize,
}

/// Two logical lines refined as a changed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinePair {
    pub a: usize,
    pub b: usize,
}

// =============================================================================
// Sub-line changes
// =============================================================================

/// What a highlighted byte range represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Present only on the new side
    Added,
    /// Present only on the old side
    Removed,
    /// Replaced by different text on the other side
    Changed,
    /// Same text found elsewhere in the partner line
    Moved,
    /// Excluded by the ignore pattern
    Ignored,
}

/// Byte range `[start, end)` within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangedRange {
    pub start: usize,
    pub end: usize,
    pub kind: ChangeKind,
}

impl ChangedRange {
    #[inline]
    pub const fn new(start: usize, end: usize, kind: ChangeKind) -> Self {
        Self { start, end, kind }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn moved(&self) -> bool {
        self.kind == ChangeKind::Moved
    }
}

/// Highlights for one line. `changes` are sorted and never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    /// Logical line index on its side
    pub idx: usize,
    /// Document line number
    pub line: usize,
    pub changes: SmallVec<[ChangedRange; 4]>,
}

impl ChangedLine {
    pub fn new(idx: usize, line: usize) -> Self {
        Self {
            idx,
            line,
            changes: SmallVec::new(),
        }
    }

    /// Bytes covered by ranges of any kind except `Ignored`.
    pub fn changed_bytes(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Ignored)
            .map(ChangedRange::len)
            .sum()
    }
}

// =============================================================================
// DiffBlock
// =============================================================================

/// A maximal run of non-matching lines: deletions in `a`, insertions in `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffBlock {
    /// Logical lines of side A (empty for a pure insertion)
    pub a: Range,
    /// Logical lines of side B (empty for a pure deletion)
    pub b: Range,
    /// Runs of `a` moved to other blocks, ascending
    pub moved_a: Vec<MoveRange>,
    /// Runs of `b` moved from other blocks, ascending
    pub moved_b: Vec<MoveRange>,
    /// Refined line pairs, monotone on both sides
    pub pairs: Vec<LinePair>,
    /// Highlights for `pairs[i].a`, same order as `pairs`
    pub changed_a: Vec<ChangedLine>,
    /// Highlights for `pairs[i].b`, same order as `pairs`
    pub changed_b: Vec<ChangedLine>,
}

impl DiffBlock {
    pub fn new(a: Range, b: Range) -> Self {
        Self {
            a,
            b,
            ..Self::default()
        }
    }

    /// Both sides have lines.
    pub fn is_replacement(&self) -> bool {
        !self.a.is_empty() && !self.b.is_empty()
    }

    /// Move ranges on `side`.
    pub fn moved(&self, side: Side) -> &[MoveRange] {
        match side {
            Side::A => &self.moved_a,
            Side::B => &self.moved_b,
        }
    }

    /// The move range on `side` holding logical line `idx`.
    pub fn move_at(&self, side: Side, idx: usize) -> Option<&MoveRange> {
        self.moved(side).iter().find(|m| m.range.contains(idx))
    }

    /// Lines of `side` covered by moves.
    pub fn moved_len(&self, side: Side) -> usize {
        self.moved(side).iter().map(|m| m.range.len()).sum()
    }

    /// Highlights on `side`, in pair order.
    pub fn changed(&self, side: Side) -> &[ChangedLine] {
        match side {
            Side::A => &self.changed_a,
            Side::B => &self.changed_b,
        }
    }

    /// Drop all refinement results.
    pub(crate) fn clear_refinement(&mut self) {
        self.pairs.clear();
        self.changed_a.clear();
        self.changed_b.clear();
    }
}

// =============================================================================
// Alignment output
// =============================================================================

/// One side of an alignment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlignSide {
    /// Document line number
    pub line: usize,
    pub mask: MarkerMask,
}

/// One row of the side-by-side view. `main` is side A, `sub` is side B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlignmentPair {
    pub main: AlignSide,
    pub sub: AlignSide,
}

impl AlignmentPair {
    pub fn get(&self, side: Side) -> &AlignSide {
        match side {
            Side::A => &self.main,
            Side::B => &self.sub,
        }
    }
}

/// Line counts for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompareSummary {
    pub matched: usize,
    pub added: usize,
    pub removed: usize,
    pub moved: usize,
    pub changed: usize,
    /// `added + removed + changed`
    pub diff_lines: usize,
}

/// A value for each side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerSide<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}
