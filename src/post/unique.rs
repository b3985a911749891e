//! Unique-line tagging.

use rustc_hash::FxHashSet;

use crate::element::LineElem;
use crate::options::Side;

/// Per-line flag: does the line's hash occur anywhere on the other side?
///
/// Lines without a counterpart are *local* and render with the softer
/// `*_LOCAL` marker variants.
#[derive(Debug, Clone, Default)]
pub struct UniqueLines {
    shared_a: Vec<bool>,
    shared_b: Vec<bool>,
}

impl UniqueLines {
    pub fn build(a: &[LineElem], b: &[LineElem]) -> Self {
        let hashes_a: FxHashSet<u64> = a.iter().map(|l| l.hash).collect();
        let hashes_b: FxHashSet<u64> = b.iter().map(|l| l.hash).collect();
        Self {
            shared_a: a.iter().map(|l| hashes_b.contains(&l.hash)).collect(),
            shared_b: b.iter().map(|l| hashes_a.contains(&l.hash)).collect(),
        }
    }

    /// True when logical line `idx` of `side` has no equal line on the other side.
    pub fn is_local(&self, side: Side, idx: usize) -> bool {
        let shared = match side {
            Side::A => &self.shared_a,
            Side::B => &self.shared_b,
        };
        !shared.get(idx).copied().unwrap_or(false)
    }
}
