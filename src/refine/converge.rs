//! Convergence refinement: pair lines by character similarity.
//!
//! Every candidate pair is scored with a char-level Myers. Each line keeps its
//! single best partner; pairs that are each other's best are then admitted in
//! decreasing score order as long as they keep the mapping monotone.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::algo::{Algorithm, diff_chunks};
use crate::element::CharElem;
use crate::error::CompareResult;
use crate::extract::SideLines;

use super::RefineCtx;
use super::words::{PairDiff, refine_pair};

/// Blocks with more candidate pairs than this stay whole-line.
pub(crate) const MAX_CONVERGE_PAIRS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scored {
    score: u32,
    a: usize,
    b: usize,
}

fn line_chars(side: &SideLines<'_>, lines: &[usize]) -> Vec<Vec<CharElem>> {
    lines
        .iter()
        .map(|&idx| {
            let mut chars = Vec::new();
            side.chars(idx, 0, usize::MAX, &mut chars);
            chars
        })
        .collect()
}

/// `200 * matched / (len_a + len_b)`: matched chars count once per side.
fn score(ctx: &RefineCtx<'_, '_>, ca: &[CharElem], cb: &[CharElem]) -> CompareResult<u32> {
    let chunks = diff_chunks(Algorithm::Myers, ca, cb, 0, &ctx.interrupt)?;
    let matched: usize = chunks.iter().map(|c| c.equal).sum();
    Ok((matched * 200 / (ca.len() + cb.len())) as u32)
}

/// Best monotone pairing of `lines_a` with `lines_b`, as positions into them.
pub(crate) fn converge(
    ctx: &RefineCtx<'_, '_>,
    lines_a: &[usize],
    lines_b: &[usize],
) -> CompareResult<Vec<(usize, usize)>> {
    if lines_a.len().saturating_mul(lines_b.len()) > MAX_CONVERGE_PAIRS {
        debug!(a = lines_a.len(), b = lines_b.len(), "block too large to converge");
        return Ok(Vec::new());
    }
    let threshold = ctx.opts.changed_resembl_percent();
    let chars_a = line_chars(ctx.a, lines_a);
    let chars_b = line_chars(ctx.b, lines_b);

    let mut best_a: Vec<Option<Scored>> = vec![None; lines_a.len()];
    let mut best_b: Vec<Option<Scored>> = vec![None; lines_b.len()];
    for (i, ca) in chars_a.iter().enumerate() {
        ctx.interrupt.check()?;
        if ca.is_empty() {
            continue;
        }
        for (j, cb) in chars_b.iter().enumerate() {
            if cb.is_empty() {
                continue;
            }
            let total = ca.len() + cb.len();
            if (ca.len().min(cb.len()) * 200 / total) < threshold as usize {
                continue;
            }
            let s = score(ctx, ca, cb)?;
            if s < threshold {
                continue;
            }
            let pair = Scored { score: s, a: i, b: j };
            if best_a[i].is_none_or(|p| s > p.score) {
                best_a[i] = Some(pair);
            }
            if best_b[j].is_none_or(|p| s > p.score) {
                best_b[j] = Some(pair);
            }
        }
    }

    let mut mutual: Vec<Scored> = best_a
        .iter()
        .flatten()
        .filter(|p| best_b[p.b] == Some(**p))
        .copied()
        .collect();
    mutual.sort_unstable_by(|x, y| y.score.cmp(&x.score).then(x.a.cmp(&y.a)).then(x.b.cmp(&y.b)));

    let mut chain: BTreeMap<usize, usize> = BTreeMap::new();
    for p in &mutual {
        let after_prev = chain.range(..p.a).next_back().is_none_or(|(_, &b)| b < p.b);
        let before_next = chain.range(p.a..).next().is_none_or(|(_, &b)| b > p.b);
        if after_prev && before_next {
            chain.insert(p.a, p.b);
        } else {
            trace!(a = p.a, b = p.b, score = p.score, "pair breaks monotone chain");
        }
    }
    Ok(chain.into_iter().collect())
}

/// Pair the lines by similarity and refine every retained pair.
pub(crate) fn refine_converge(
    ctx: &RefineCtx<'_, '_>,
    lines_a: &[usize],
    lines_b: &[usize],
) -> CompareResult<Vec<PairDiff>> {
    converge(ctx, lines_a, lines_b)?
        .into_iter()
        .map(|(i, j)| refine_pair(ctx, lines_a[i], lines_b[j]))
        .collect()
}
