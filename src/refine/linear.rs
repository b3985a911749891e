//! Linear refinement: line `i` of A pairs with line `i` of B.
//!
//! The words of the whole block run through one Myers pass so a word that
//! wandered to a neighbouring line does not anchor anything. Only matches
//! whose two words sit on partner lines become anchors for that pair.

use crate::algo::{Algorithm, diff_chunks};
use crate::element::WordElem;
use crate::error::CompareResult;

use super::RefineCtx;
use super::words::{PairDiff, refine_with_anchors};

/// Words of several lines, concatenated, with the owner of each word.
struct BlockWords {
    words: Vec<WordElem>,
    owner: Vec<usize>,
    /// Start offset of each line's words, plus a trailing end
    starts: Vec<usize>,
}

impl BlockWords {
    fn collect(lines: &[usize], mut fill: impl FnMut(usize, &mut Vec<WordElem>)) -> Self {
        let mut words = Vec::new();
        let mut owner = Vec::new();
        let mut starts = Vec::with_capacity(lines.len() + 1);
        for (pos, &line) in lines.iter().enumerate() {
            starts.push(words.len());
            fill(line, &mut words);
            owner.resize(words.len(), pos);
        }
        starts.push(words.len());
        Self { words, owner, starts }
    }

    #[inline]
    fn line(&self, pos: usize) -> &[WordElem] {
        &self.words[self.starts[pos]..self.starts[pos + 1]]
    }
}

/// Refine `lines_a[i]` against `lines_b[i]` for every `i`.
pub(crate) fn refine_linear(
    ctx: &RefineCtx<'_, '_>,
    lines_a: &[usize],
    lines_b: &[usize],
) -> CompareResult<Vec<PairDiff>> {
    debug_assert_eq!(lines_a.len(), lines_b.len());
    let wa = BlockWords::collect(lines_a, |idx, out| ctx.a.words(idx, out));
    let wb = BlockWords::collect(lines_b, |idx, out| ctx.b.words(idx, out));

    let chunks = diff_chunks(Algorithm::Myers, &wa.words, &wb.words, 0, &ctx.interrupt)?;
    let mut anchors: Vec<Vec<(usize, usize)>> = vec![Vec::new(); lines_a.len()];
    for chunk in &chunks {
        for k in 0..chunk.equal {
            let (ia, ib) = (chunk.a_off + k, chunk.b_off + k);
            let pos = wa.owner[ia];
            if wb.owner[ib] == pos {
                anchors[pos].push((ia - wa.starts[pos], ib - wb.starts[pos]));
            }
        }
    }

    let mut out = Vec::with_capacity(lines_a.len());
    for (pos, (&la, &lb)) in lines_a.iter().zip(lines_b).enumerate() {
        out.push(refine_with_anchors(ctx, la, lb, wa.line(pos), wb.line(pos), &anchors[pos])?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SideLines;
    use crate::interrupt::Interrupt;
    use crate::model::ChangeKind;
    use crate::options::CompareOptions;
    use crate::source::MemorySource;

    fn run(a: &str, b: &str) -> Vec<PairDiff> {
        let opts = CompareOptions::default();
        let (ma, mb) = (MemorySource::new(a), MemorySource::new(b));
        let never = Interrupt::never();
        let sa = SideLines::extract(&ma, None, &opts.ignore, None, &never).unwrap();
        let sb = SideLines::extract(&mb, None, &opts.ignore, None, &never).unwrap();
        let ctx = RefineCtx { a: &sa, b: &sb, opts: &opts, interrupt: never };
        let lines: Vec<usize> = (0..sa.len()).collect();
        refine_linear(&ctx, &lines, &lines).unwrap()
    }

    #[test]
    fn test_pairs_lines_positionally() {
        let diffs = run("let x = 1;\nlet y = 2;\n", "let x = 3;\nlet y = 2;\n");
        assert_eq!(diffs.len(), 2);
        assert_eq!((diffs[0].a.idx, diffs[0].b.idx), (0, 0));
        assert_eq!(diffs[0].a.changes.len(), 1);
        assert_eq!(diffs[0].a.changes[0].kind, ChangeKind::Changed);
        assert_eq!((diffs[0].a.changes[0].start, diffs[0].a.changes[0].end), (8, 9));
        assert!(diffs[1].a.changes.is_empty());
        assert_eq!(diffs[1].similarity, 100);
    }

    #[test]
    fn test_cross_line_matches_do_not_anchor() {
        // "two" matches across lines in the block-wide diff but not between
        // partners, so both pairs stay full replacements
        let diffs = run("one\ntwo\n", "two\nsix\n");
        assert_eq!(diffs.len(), 2);
        for diff in &diffs {
            assert!(diff.similarity < 100);
            assert_eq!(diff.a.changes[0].start, 0);
            assert_eq!(diff.a.changes[0].kind, ChangeKind::Changed);
        }
    }
}
