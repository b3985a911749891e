//! Sub-line ranges for one refined line pair.
//!
//! A pair is described by the word matches between its two lines. Every gap
//! between consecutive matches is a word replacement; it is narrowed to the
//! characters that actually differ and emitted as change ranges.

use smallvec::SmallVec;

use crate::algo::{Algorithm, diff_chunks};
use crate::element::{CharElem, DiffElement, WordElem};
use crate::error::CompareResult;
use crate::extract::SideLines;
use crate::model::{ChangeKind, ChangedLine, ChangedRange, Range};
use crate::options::Side;

use super::RefineCtx;

/// Shortest run of equal characters allowed to split a highlight.
pub(crate) const MIN_CHAR_RUN: usize = 2;

/// Highlights and similarity of one line pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PairDiff {
    pub a: ChangedLine,
    pub b: ChangedLine,
    /// Percentage of retained bytes left unhighlighted on both lines
    pub similarity: u32,
}

/// Word-diff `la` against `lb` and build their highlights.
pub(crate) fn refine_pair(ctx: &RefineCtx<'_, '_>, la: usize, lb: usize) -> CompareResult<PairDiff> {
    let mut wa = Vec::new();
    let mut wb = Vec::new();
    ctx.a.words(la, &mut wa);
    ctx.b.words(lb, &mut wb);
    let chunks = diff_chunks(Algorithm::Myers, &wa, &wb, 0, &ctx.interrupt)?;
    let anchors: Vec<(usize, usize)> = chunks
        .iter()
        .flat_map(|c| (0..c.equal).map(move |k| (c.a_off + k, c.b_off + k)))
        .collect();
    refine_with_anchors(ctx, la, lb, &wa, &wb, &anchors)
}

/// Build highlights for `la`/`lb` from known word matches (ascending on both sides).
pub(crate) fn refine_with_anchors(
    ctx: &RefineCtx<'_, '_>,
    la: usize,
    lb: usize,
    wa: &[WordElem],
    wb: &[WordElem],
    anchors: &[(usize, usize)],
) -> CompareResult<PairDiff> {
    let mut a = ChangedLine::new(la, ctx.a.doc_line(la));
    let mut b = ChangedLine::new(lb, ctx.b.doc_line(lb));

    for (ga, gb) in gaps(wa.len(), wb.len(), anchors) {
        narrow(ctx, la, lb, byte_span(wa, ga), byte_span(wb, gb), &mut a, &mut b)?;
    }
    a.changes.sort_unstable_by_key(|r| r.start);
    b.changes.sort_unstable_by_key(|r| r.start);

    if ctx.opts.detect_sub_line_moves {
        mark_moves(ctx, &mut a, &mut b);
    }

    let similarity = similarity(word_bytes(wa), a.changed_bytes(), word_bytes(wb), b.changed_bytes());

    if ctx.opts.ignore.highlights_ignores() {
        merge_ignored(&mut a, ctx.a.ignored_spans(la));
        merge_ignored(&mut b, ctx.b.ignored_spans(lb));
    }
    Ok(PairDiff { a, b, similarity })
}

/// Unmatched word ranges between consecutive anchors.
fn gaps(na: usize, nb: usize, anchors: &[(usize, usize)]) -> Vec<(Range, Range)> {
    let mut out = Vec::new();
    let (mut pa, mut pb) = (0, 0);
    for &(ia, ib) in anchors.iter().chain(std::iter::once(&(na, nb))) {
        if ia > pa || ib > pb {
            out.push((Range::new(pa, ia), Range::new(pb, ib)));
        }
        pa = ia + 1;
        pb = ib + 1;
    }
    out
}

fn byte_span(words: &[WordElem], r: Range) -> Option<Range> {
    if r.is_empty() {
        return None;
    }
    Some(Range::new(words[r.s].byte_off as usize, words[r.e - 1].byte_end() as usize))
}

fn word_bytes(words: &[WordElem]) -> usize {
    words.iter().map(|w| w.byte_len as usize).sum()
}

/// `100 * matched / total` over both lines; two empty lines are identical.
pub(crate) fn similarity(total_a: usize, changed_a: usize, total_b: usize, changed_b: usize) -> u32 {
    let total = total_a + total_b;
    if total == 0 {
        return 100;
    }
    let matched = total_a.saturating_sub(changed_a) + total_b.saturating_sub(changed_b);
    (matched * 100 / total) as u32
}

// =============================================================================
// Narrowing
// =============================================================================

fn side_kind(ctx: &RefineCtx<'_, '_>, side: Side) -> ChangeKind {
    if side == ctx.opts.new_side {
        ChangeKind::Added
    } else {
        ChangeKind::Removed
    }
}

fn push_chars(line: &mut ChangedLine, chars: &[CharElem], kind: ChangeKind) {
    if let (Some(first), Some(last)) = (chars.first(), chars.last()) {
        line.changes.push(ChangedRange::new(
            first.byte_pos as usize,
            last.byte_end() as usize,
            kind,
        ));
    }
}

fn chars_in(side: &SideLines<'_>, idx: usize, span: Option<Range>) -> Vec<CharElem> {
    let mut out = Vec::new();
    if let Some(span) = span {
        side.chars(idx, span.s, span.e, &mut out);
    }
    out
}

/// Emit the ranges for one word replacement.
fn narrow(
    ctx: &RefineCtx<'_, '_>,
    la: usize,
    lb: usize,
    span_a: Option<Range>,
    span_b: Option<Range>,
    a: &mut ChangedLine,
    b: &mut ChangedLine,
) -> CompareResult<()> {
    let ca = chars_in(ctx.a, la, span_a);
    let cb = chars_in(ctx.b, lb, span_b);
    if ca.is_empty() || cb.is_empty() {
        push_chars(a, &ca, side_kind(ctx, Side::A));
        push_chars(b, &cb, side_kind(ctx, Side::B));
        return Ok(());
    }

    let prefix = run_or_zero(ca.iter().zip(&cb).take_while(|(x, y)| x.key() == y.key()).count());
    let suffix = run_or_zero(
        ca[prefix..]
            .iter()
            .rev()
            .zip(cb[prefix..].iter().rev())
            .take_while(|(x, y)| x.key() == y.key())
            .count(),
    );
    let ma = &ca[prefix..ca.len() - suffix];
    let mb = &cb[prefix..cb.len() - suffix];

    let residues = if ctx.opts.detect_char_diffs && !ma.is_empty() && !mb.is_empty() {
        char_residues(ctx, ma, mb)?
    } else {
        vec![(Range::new(0, ma.len()), Range::new(0, mb.len()))]
    };

    for (ra, rb) in residues {
        let (ra, rb) = (&ma[ra.s..ra.e], &mb[rb.s..rb.e]);
        match (ra.is_empty(), rb.is_empty()) {
            (false, false) => {
                push_chars(a, ra, ChangeKind::Changed);
                push_chars(b, rb, ChangeKind::Changed);
            }
            (false, true) => push_chars(a, ra, side_kind(ctx, Side::A)),
            (true, false) => push_chars(b, rb, side_kind(ctx, Side::B)),
            (true, true) => {}
        }
    }
    Ok(())
}

#[inline]
fn run_or_zero(run: usize) -> usize {
    if run >= MIN_CHAR_RUN { run } else { 0 }
}

/// Char-level diff of a replacement; equal runs shorter than
/// [`MIN_CHAR_RUN`] stay inside the highlight.
fn char_residues(ctx: &RefineCtx<'_, '_>, ma: &[CharElem], mb: &[CharElem]) -> CompareResult<Vec<(Range, Range)>> {
    let chunks = diff_chunks(Algorithm::Myers, ma, mb, 0, &ctx.interrupt)?;
    let mut out = Vec::new();
    let (mut pa, mut pb) = (0, 0);
    for c in &chunks {
        if c.equal >= MIN_CHAR_RUN {
            if c.a_off > pa || c.b_off > pb {
                out.push((Range::new(pa, c.a_off), Range::new(pb, c.b_off)));
            }
            pa = c.a_off + c.equal;
            pb = c.b_off + c.equal;
        }
    }
    if pa < ma.len() || pb < mb.len() {
        out.push((Range::new(pa, ma.len()), Range::new(pb, mb.len())));
    }
    Ok(out)
}

// =============================================================================
// Sub-line moves and ignored spans
// =============================================================================

/// Char keys of a range without surrounding whitespace.
fn range_keys(side: &SideLines<'_>, idx: usize, r: &ChangedRange) -> Vec<u64> {
    let mut chars = Vec::new();
    side.chars(idx, r.start, r.end, &mut chars);
    let is_space = |k: &u64| *k == u64::from(' ') || *k == u64::from('\t');
    let mut keys: Vec<u64> = chars.iter().map(DiffElement::key).collect();
    while keys.last().is_some_and(is_space) {
        keys.pop();
    }
    let lead = keys.iter().take_while(|k| is_space(*k)).count();
    keys.drain(..lead);
    keys
}

/// Mark change ranges with identical text on both lines as moved.
fn mark_moves(ctx: &RefineCtx<'_, '_>, a: &mut ChangedLine, b: &mut ChangedLine) {
    let b_keys: Vec<Vec<u64>> = b.changes.iter().map(|r| range_keys(ctx.b, b.idx, r)).collect();
    let mut used = vec![false; b.changes.len()];
    for ra in a.changes.iter_mut() {
        let ka = range_keys(ctx.a, a.idx, ra);
        if ka.is_empty() {
            continue;
        }
        if let Some(j) = (0..b_keys.len()).find(|&j| !used[j] && b_keys[j] == ka) {
            used[j] = true;
            ra.kind = ChangeKind::Moved;
            b.changes[j].kind = ChangeKind::Moved;
        }
    }
}

/// Add `Ignored` ranges for `spans`, cutting other ranges around them.
pub(crate) fn merge_ignored(line: &mut ChangedLine, spans: &[Range]) {
    if spans.is_empty() {
        return;
    }
    let mut merged: SmallVec<[ChangedRange; 4]> = SmallVec::new();
    for r in line.changes.drain(..) {
        let mut start = r.start;
        for s in spans {
            if s.e <= start || s.s >= r.end {
                continue;
            }
            if s.s > start {
                merged.push(ChangedRange::new(start, s.s, r.kind));
            }
            start = start.max(s.e);
        }
        if start < r.end {
            merged.push(ChangedRange::new(start, r.end, r.kind));
        }
    }
    merged.extend(spans.iter().map(|s| ChangedRange::new(s.s, s.e, ChangeKind::Ignored)));
    merged.sort_unstable_by_key(|r| r.start);
    line.changes = merged;
}
