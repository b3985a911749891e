//! Alignment emission: the side-by-side rows and the summary counts.
//!
//! The chunked script is walked once with a cursor per side. Matches become
//! unmarked rows. Inside a block, the lines before each refined pair are
//! flushed as one-sided rows (A first, then B) and the pair itself becomes a
//! `CHANGED` row.

mod marker;

pub use marker::{MarkerMask, iter_markers, iter_sub_line_changes};

use tracing::debug;

use crate::algo::Chunk;
use crate::error::{CompareResult, try_vec};
use crate::extract::SideLines;
use crate::interrupt::{EMIT_POLL, Interrupt, Ticker};
use crate::model::{AlignSide, AlignmentPair, CompareSummary, DiffBlock, LinePair};
use crate::options::Side;
use crate::post::UniqueLines;

/// Inputs of the emitter.
pub(crate) struct EmitInput<'a, 's> {
    pub chunks: &'a [Chunk],
    pub blocks: &'a [DiffBlock],
    pub a: &'a SideLines<'s>,
    pub b: &'a SideLines<'s>,
    pub unique: &'a UniqueLines,
    pub new_side: Side,
}

struct Emitter<'a, 's, 'i> {
    input: &'a EmitInput<'a, 's>,
    ticker: Ticker<'i>,
    rows: Vec<AlignmentPair>,
    summary: CompareSummary,
}

/// Build the alignment rows and summary for a refined script.
pub(crate) fn emit(
    input: &EmitInput<'_, '_>,
    interrupt: &Interrupt<'_>,
) -> CompareResult<(Vec<AlignmentPair>, CompareSummary)> {
    let rows = try_vec(input.a.len().max(input.b.len()), "alignment rows")?;
    let mut emitter = Emitter {
        input,
        ticker: interrupt.ticker(EMIT_POLL),
        rows,
        summary: CompareSummary::default(),
    };

    let mut blocks = input.blocks.iter();
    for chunk in input.chunks {
        emitter.matched(chunk)?;
        if chunk.has_block() {
            if let Some(block) = blocks.next() {
                emitter.block(block)?;
            }
        }
    }

    let moved: usize = input
        .blocks
        .iter()
        .map(|b| b.moved_len(Side::A) + b.moved_len(Side::B))
        .sum();
    let summary = &mut emitter.summary;
    summary.moved = moved / 2;
    summary.diff_lines = summary.added + summary.removed + summary.changed;
    debug!(rows = emitter.rows.len(), summary = ?emitter.summary, "emitted alignment");
    Ok((emitter.rows, emitter.summary))
}

impl Emitter<'_, '_, '_> {
    fn side(&self, side: Side) -> &SideLines<'_> {
        match side {
            Side::A => self.input.a,
            Side::B => self.input.b,
        }
    }

    fn push(&mut self, main: AlignSide, sub: AlignSide) -> CompareResult<()> {
        self.ticker.tick()?;
        self.rows.push(AlignmentPair { main, sub });
        Ok(())
    }

    fn matched(&mut self, chunk: &Chunk) -> CompareResult<()> {
        for k in 0..chunk.equal {
            let main = AlignSide {
                line: self.input.a.doc_line(chunk.a_off + k),
                mask: MarkerMask::MATCH,
            };
            let sub = AlignSide {
                line: self.input.b.doc_line(chunk.b_off + k),
                mask: MarkerMask::MATCH,
            };
            self.push(main, sub)?;
        }
        self.summary.matched += chunk.equal;
        Ok(())
    }

    fn block(&mut self, block: &DiffBlock) -> CompareResult<()> {
        let (mut ai, mut bi) = (block.a.s, block.b.s);
        let end = LinePair { a: block.a.e, b: block.b.e };
        for (k, pair) in block.pairs.iter().chain(std::iter::once(&end)).enumerate() {
            while ai < pair.a {
                self.one_sided(block, Side::A, ai, bi)?;
                ai += 1;
            }
            while bi < pair.b {
                self.one_sided(block, Side::B, bi, ai)?;
                bi += 1;
            }
            if k < block.pairs.len() {
                let unique = self.input.unique;
                let main = AlignSide {
                    line: self.input.a.doc_line(pair.a),
                    mask: MarkerMask::changed(unique.is_local(Side::A, pair.a)),
                };
                let sub = AlignSide {
                    line: self.input.b.doc_line(pair.b),
                    mask: MarkerMask::changed(unique.is_local(Side::B, pair.b)),
                };
                self.push(main, sub)?;
                self.summary.changed += 1;
                ai = pair.a + 1;
                bi = pair.b + 1;
            }
        }
        Ok(())
    }

    /// Row for logical line `idx` of `side`; `other` is the cursor on the
    /// opposite side.
    fn one_sided(&mut self, block: &DiffBlock, side: Side, idx: usize, other: usize) -> CompareResult<()> {
        let mask = match block.move_at(side, idx) {
            Some(m) => MarkerMask::moved(idx - m.range.s, m.range.len()),
            None => {
                let new_side = self.input.new_side;
                if side == new_side {
                    self.summary.added += 1;
                } else {
                    self.summary.removed += 1;
                }
                MarkerMask::one_sided(side, new_side, self.input.unique.is_local(side, idx))
            }
        };
        let this = AlignSide {
            line: self.side(side).doc_line(idx),
            mask,
        };
        let cursor = AlignSide {
            line: self.side(side.other()).cursor_doc(other),
            mask: MarkerMask::MATCH,
        };
        match side {
            Side::A => self.push(this, cursor),
            Side::B => self.push(cursor, this),
        }
    }
}
