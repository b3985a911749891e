//! Marker masks handed to the host for rendering.

use crate::model::{AlignmentPair, ChangeKind, ChangedLine};
use crate::options::Side;

bitflags::bitflags! {
    /// Markers of one side of an alignment row. The empty mask is a match.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MarkerMask: u16 {
        /// Line exists only on the new side
        const ADDED = 1 << 0;
        /// Line exists only on the old side
        const REMOVED = 1 << 1;
        /// Line is paired with a similar line
        const CHANGED = 1 << 2;
        /// One-line move
        const MOVED_SINGLE = 1 << 3;
        /// First line of a moved run
        const MOVED_BEGIN = 1 << 4;
        /// Interior line of a moved run
        const MOVED_MID = 1 << 5;
        /// Last line of a moved run
        const MOVED_END = 1 << 6;
        /// `ADDED`, and the text occurs nowhere on the other side
        const ADDED_LOCAL = 1 << 7;
        /// `REMOVED`, and the text occurs nowhere on the other side
        const REMOVED_LOCAL = 1 << 8;
        /// `CHANGED`, and the text occurs nowhere on the other side
        const CHANGED_LOCAL = 1 << 9;

        const ANY_MOVED = Self::MOVED_SINGLE.bits()
            | Self::MOVED_BEGIN.bits()
            | Self::MOVED_MID.bits()
            | Self::MOVED_END.bits();
        const ANY_ADDED = Self::ADDED.bits() | Self::ADDED_LOCAL.bits();
        const ANY_REMOVED = Self::REMOVED.bits() | Self::REMOVED_LOCAL.bits();
        const ANY_CHANGED = Self::CHANGED.bits() | Self::CHANGED_LOCAL.bits();
    }
}

impl MarkerMask {
    /// Equal on both sides.
    pub const MATCH: Self = Self::empty();

    #[inline]
    pub fn is_match(self) -> bool {
        self.is_empty()
    }

    #[inline]
    pub fn is_moved(self) -> bool {
        self.intersects(Self::ANY_MOVED)
    }

    #[inline]
    pub fn is_changed(self) -> bool {
        self.intersects(Self::ANY_CHANGED)
    }

    /// `ADDED` or `REMOVED` for a line present on `side` only, given which
    /// side is new.
    pub fn one_sided(side: Side, new_side: Side, local: bool) -> Self {
        match (side == new_side, local) {
            (true, false) => Self::ADDED,
            (true, true) => Self::ADDED_LOCAL,
            (false, false) => Self::REMOVED,
            (false, true) => Self::REMOVED_LOCAL,
        }
    }

    pub fn changed(local: bool) -> Self {
        if local { Self::CHANGED_LOCAL } else { Self::CHANGED }
    }

    /// Moved marker for offset `pos` of a run of `len` lines.
    pub fn moved(pos: usize, len: usize) -> Self {
        if len <= 1 {
            Self::MOVED_SINGLE
        } else if pos == 0 {
            Self::MOVED_BEGIN
        } else if pos + 1 == len {
            Self::MOVED_END
        } else {
            Self::MOVED_MID
        }
    }
}

/// `(side, document line, mask)` for every side of `pair` carrying a marker.
pub fn iter_markers(pair: &AlignmentPair) -> impl Iterator<Item = (Side, usize, MarkerMask)> + '_ {
    [Side::A, Side::B].into_iter().filter_map(move |side| {
        let s = pair.get(side);
        (!s.mask.is_match()).then_some((side, s.line, s.mask))
    })
}

/// `(start_byte, end_byte, kind)` for every highlight of `line`.
pub fn iter_sub_line_changes(line: &ChangedLine) -> impl Iterator<Item = (usize, usize, ChangeKind)> + '_ {
    line.changes.iter().map(|c| (c.start, c.end, c.kind))
}
