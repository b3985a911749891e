//! Post-processing of the line script: blocks, moves and unique-line tags.

mod moves;
mod unique;

pub(crate) use moves::detect_moves;
pub use unique::UniqueLines;

use crate::algo::Chunk;
use crate::model::{DiffBlock, Range};

/// One [`DiffBlock`] per chunk that carries edits, in script order.
pub(crate) fn build_blocks(chunks: &[Chunk]) -> Vec<DiffBlock> {
    chunks
        .iter()
        .filter(|c| c.has_block())
        .map(|c| {
            DiffBlock::new(
                Range::new(c.del_start(), c.del_start() + c.del),
                Range::new(c.ins_start(), c.ins_start() + c.ins),
            )
        })
        .collect()
}
