//! The comparison pipeline.
//!
//! ```text
//! extract ──▶ line diff ──▶ blocks ──▶ moves ──▶ refine ──▶ emit
//!  (C1)         (C2)         (C3)       (C3)      (C4)      (C5)
//! ```
//!
//! Every stage polls the caller's [`Interrupt`]; the first error aborts the
//! whole comparison and nothing partial is returned.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::algo::{EditOp, diff_chunks, from_chunks};
use crate::emit::{EmitInput, MarkerMask, emit, iter_markers};
use crate::error::{CompareError, CompareResult};
use crate::extract::{IgnoreFilter, SideLines};
use crate::interrupt::Interrupt;
use crate::model::{AlignSide, AlignmentPair, ChangedLine, CompareSummary, DiffBlock, PerSide};
use crate::options::{CompareOptions, Side};
use crate::post::{UniqueLines, build_blocks, detect_moves};
use crate::refine::{RefineCtx, merge_ignored, refine_blocks};
use crate::source::TextSource;

/// Everything a comparison produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOutput {
    pub summary: CompareSummary,
    /// Side-by-side rows, monotone on both sides
    pub alignment: Vec<AlignmentPair>,
    /// Line-level edit script over the logical lines
    pub script: Vec<EditOp>,
    /// Replacement blocks with their moves and refined pairs
    pub blocks: Vec<DiffBlock>,
    /// Ignored-span highlights of lines outside refined pairs (only with
    /// `highlight_ignores`)
    pub ignored: PerSide<Vec<ChangedLine>>,
}

impl CompareOutput {
    /// The result hosts show when both sides are empty: one unmarked row.
    pub fn empty_input() -> Self {
        let side = AlignSide {
            line: 0,
            mask: MarkerMask::MATCH,
        };
        Self {
            summary: CompareSummary::default(),
            alignment: vec![AlignmentPair { main: side, sub: side }],
            script: Vec::new(),
            blocks: Vec::new(),
            ignored: PerSide::default(),
        }
    }

    /// No line was added, removed or changed.
    pub fn is_identical(&self) -> bool {
        self.summary.diff_lines == 0
    }

    /// Every marker of every row, in row order.
    pub fn markers(&self) -> impl Iterator<Item = (Side, usize, MarkerMask)> + '_ {
        self.alignment.iter().flat_map(iter_markers)
    }

    /// Refined highlights of both sides, in block order.
    pub fn changed_lines(&self, side: Side) -> impl Iterator<Item = &ChangedLine> + '_ {
        self.blocks.iter().flat_map(move |b| b.changed(side))
    }
}

/// Compare `a` against `b`.
pub fn compare(a: &dyn TextSource, b: &dyn TextSource, opts: &CompareOptions) -> CompareResult<CompareOutput> {
    compare_with(a, b, opts, &Interrupt::never())
}

/// Compare `a` against `b`, polling `interrupt` for cancellation.
pub fn compare_with(
    a: &dyn TextSource,
    b: &dyn TextSource,
    opts: &CompareOptions,
    interrupt: &Interrupt<'_>,
) -> CompareResult<CompareOutput> {
    let filter = opts.ignore.regex.as_ref().map(IgnoreFilter::compile).transpose()?;
    let span = |side| opts.selection.map(|s| s.span(side));
    let sa = SideLines::extract(a, span(Side::A), &opts.ignore, filter.as_ref(), interrupt)?;
    let sb = SideLines::extract(b, span(Side::B), &opts.ignore, filter.as_ref(), interrupt)?;
    if sa.is_empty() && sb.is_empty() {
        return Err(CompareError::EmptyInput);
    }

    let chunks = diff_chunks(
        opts.algorithm,
        sa.lines(),
        sb.lines(),
        opts.histogram_max_occurrences,
        interrupt,
    )?;
    let mut blocks = build_blocks(&chunks);
    debug!(algorithm = ?opts.algorithm, chunks = chunks.len(), blocks = blocks.len(), "line diff");

    let unique = UniqueLines::build(sa.lines(), sb.lines());
    if opts.detect_moves {
        let moved = detect_moves(&mut blocks, sa.lines(), sb.lines());
        debug!(moved, "detected moves");
    }

    let ctx = RefineCtx {
        a: &sa,
        b: &sb,
        opts,
        interrupt: *interrupt,
    };
    refine_blocks(&mut blocks, &ctx)?;

    let input = EmitInput {
        chunks: &chunks,
        blocks: &blocks,
        a: &sa,
        b: &sb,
        unique: &unique,
        new_side: opts.new_side,
    };
    let (alignment, summary) = emit(&input, interrupt)?;

    let ignored = if opts.ignore.highlights_ignores() {
        PerSide {
            a: ignored_lines(&sa, &blocks, Side::A),
            b: ignored_lines(&sb, &blocks, Side::B),
        }
    } else {
        PerSide::default()
    };

    debug!(?summary, "comparison done");
    Ok(CompareOutput {
        summary,
        alignment,
        script: from_chunks(&chunks),
        blocks,
        ignored,
    })
}

/// Ignored-span highlights for lines of `side` that no refined pair covers.
fn ignored_lines(lines: &SideLines<'_>, blocks: &[DiffBlock], side: Side) -> Vec<ChangedLine> {
    let paired: FxHashSet<usize> = blocks
        .iter()
        .flat_map(|b| b.changed(side))
        .map(|c| c.idx)
        .collect();
    lines
        .lines_with_ignores()
        .into_iter()
        .filter(|idx| !paired.contains(idx))
        .map(|idx| {
            let mut line = ChangedLine::new(idx, lines.doc_line(idx));
            merge_ignored(&mut line, lines.ignored_spans(idx));
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::RegexIgnore;
    use crate::source::MemorySource;

    #[test]
    fn test_identical_inputs() {
        let text = MemorySource::new("one\ntwo\nthree\n");
        let out = compare(&text, &text, &CompareOptions::default()).unwrap();
        assert!(out.is_identical());
        assert_eq!(out.summary.matched, 3);
        assert_eq!(out.markers().count(), 0);
        assert!(out.blocks.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let empty = MemorySource::new("");
        let err = compare(&empty, &empty, &CompareOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
        let fallback = CompareOutput::empty_input();
        assert_eq!(fallback.alignment.len(), 1);
        assert!(fallback.is_identical());
    }

    #[test]
    fn test_bad_regex() {
        let text = MemorySource::new("x\n");
        let opts = CompareOptions::default().with_regex(RegexIgnore::new("(unclosed"));
        let err = compare(&text, &text, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRegex);
    }

    #[test]
    fn test_ignored_lines_outside_pairs() {
        let a = MemorySource::new("id 1 keep\nstable\n");
        let b = MemorySource::new("id 2 keep\nstable\n");
        let opts = CompareOptions::default().with_regex(RegexIgnore::new(r"\d+").highlighted());
        let out = compare(&a, &b, &opts).unwrap();
        assert!(out.is_identical());
        assert_eq!(out.ignored.a.len(), 1);
        assert_eq!(out.ignored.a[0].changes[0].start, 3);
        assert_eq!(out.ignored.a[0].changes[0].end, 4);
    }

    #[test]
    fn test_changed_lines_follow_pairs() {
        let a = MemorySource::new("fn main() {\n    run(1);\n}\n");
        let b = MemorySource::new("fn main() {\n    run(2);\n}\n");
        let out = compare(&a, &b, &CompareOptions::default()).unwrap();
        assert_eq!(out.summary.changed, 1);
        assert_eq!(out.changed_lines(Side::A).count(), 1);
        assert_eq!(out.changed_lines(Side::B).next().map(|c| c.line), Some(1));
    }
}
