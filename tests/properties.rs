//! Property-based tests for the comparison pipeline.
//!
//! Inputs are drawn from a tiny alphabet so duplicate lines, moves and
//! partial matches show up in most cases.

use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use sidediff::algo::{Algorithm, EditOp, OpTag, diff, shift_boundaries, to_chunks};
use sidediff::prelude::*;

const ALGORITHMS: [Algorithm; 3] = [Algorithm::Myers, Algorithm::FastMyers, Algorithm::Histogram];

/// Short sequences over a small alphabet
fn seq_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..6, 0..40)
}

/// One line of text, terminator included
fn line_strategy() -> impl Strategy<Value = String> {
    "[ab c]{0,6}".prop_map(|s| format!("{s}\n"))
}

/// A document of up to 30 lines
fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..30).prop_map(|lines| lines.concat())
}

fn ignore_strategy() -> impl Strategy<Value = IgnoreOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(empty_lines, eol, all_spaces, changed_spaces, case)| IgnoreOptions {
            empty_lines,
            eol,
            all_spaces,
            changed_spaces,
            case,
            ..IgnoreOptions::default()
        },
    )
}

/// Lines of a few recurring words, so refined pairs share most of their text
fn word_text_strategy() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec!["foo", "bar", "baz", "  ", "qux(1)", "x_2"]);
    let line = prop::collection::vec(words, 0..6).prop_map(|words| format!("{}\n", words.join(" ")));
    prop::collection::vec(line, 0..16).prop_map(|lines| lines.concat())
}

/// A highlighted regex ignore over the word alphabet
fn regex_strategy() -> impl Strategy<Value = Option<RegexIgnore>> {
    let pattern = prop_oneof![Just(r"\d+"), Just("ba[rz]"), Just(r"\s+"), Just(r"\(.*\)")];
    prop::option::of((pattern, any::<bool>()).prop_map(|(pattern, invert)| RegexIgnore {
        invert,
        highlight_ignores: true,
        ..RegexIgnore::new(pattern)
    }))
}

/// Length of a longest common subsequence, by dynamic programming
fn lcs_len(a: &[u64], b: &[u64]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diag = 0;
        for (j, y) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if x == y { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

fn compare_text(a: &str, b: &str, opts: &CompareOptions) -> CompareResult<CompareOutput> {
    compare(&MemorySource::new(a), &MemorySource::new(b), opts)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Match and In1 runs rebuild A; Match and In2 runs rebuild B
    #[test]
    fn script_reconstructs_both_sides(a in seq_strategy(), b in seq_strategy()) {
        for algorithm in ALGORITHMS {
            let ops = diff(algorithm, &a, &b, 8, &Interrupt::never()).unwrap();
            let (mut ia, mut ib) = (0, 0);
            for op in &ops {
                match op.tag {
                    OpTag::Match => {
                        prop_assert_eq!(op.off, ia);
                        prop_assert_eq!(&a[ia..ia + op.len], &b[ib..ib + op.len]);
                        ia += op.len;
                        ib += op.len;
                    }
                    OpTag::In1 => {
                        prop_assert_eq!(op.off, ia);
                        ia += op.len;
                    }
                    OpTag::In2 => {
                        prop_assert_eq!(op.off, ib);
                        ib += op.len;
                    }
                }
            }
            prop_assert_eq!(ia, a.len());
            prop_assert_eq!(ib, b.len());
            prop_assert_eq!(ops.iter().map(EditOp::a_len).sum::<usize>(), a.len());
        }
    }

    /// A second boundary shift changes nothing
    #[test]
    fn boundary_shift_is_idempotent(a in seq_strategy(), b in seq_strategy()) {
        for algorithm in ALGORITHMS {
            let ops = diff(algorithm, &a, &b, 8, &Interrupt::never()).unwrap();
            let mut chunks = to_chunks(&ops);
            let once = chunks.clone();
            shift_boundaries(&a, &b, &mut chunks);
            prop_assert_eq!(once, chunks);
        }
    }

    /// Every A move has a mirror B move of the same length and content
    #[test]
    fn moves_are_symmetric(a in text_strategy(), b in text_strategy()) {
        let (sa, sb) = (MemorySource::new(a), MemorySource::new(b));
        let Ok(out) = compare(&sa, &sb, &CompareOptions::default()) else {
            return Ok(());
        };
        let mut total_a = 0;
        let mut total_b = 0;
        for block in &out.blocks {
            total_b += block.moved_b.iter().map(|m| m.range.len()).sum::<usize>();
            for m in &block.moved_a {
                total_a += m.range.len();
                let peer = &out.blocks[m.peer_block];
                let mirrors: Vec<_> = peer.moved_b.iter().filter(|p| p.range.s == m.peer_start).collect();
                prop_assert_eq!(mirrors.len(), 1);
                prop_assert_eq!(mirrors[0].range.len(), m.range.len());
                for k in 0..m.range.len() {
                    // Default options keep every line, so logical == document
                    prop_assert_eq!(sa.line(m.range.s + k), sb.line(m.peer_start + k));
                }
            }
        }
        prop_assert_eq!(total_a, total_b);
        prop_assert_eq!(out.summary.moved, total_a);
    }

    /// Rows never go backwards on either side
    #[test]
    fn alignment_is_monotone(a in text_strategy(), b in text_strategy(), ignore in ignore_strategy()) {
        let opts = CompareOptions::default().with_ignore(ignore);
        if let Ok(out) = compare_text(&a, &b, &opts) {
            for w in out.alignment.windows(2) {
                prop_assert!(w[0].main.line <= w[1].main.line);
                prop_assert!(w[0].sub.line <= w[1].sub.line);
            }
            let s = out.summary;
            prop_assert_eq!(s.diff_lines, s.added + s.removed + s.changed);
        }
    }

    /// Pairs and highlights line up per block; highlights are sorted and disjoint
    #[test]
    fn changed_lines_are_consistent(
        a in word_text_strategy(),
        b in word_text_strategy(),
        ignore in ignore_strategy(),
        regex in regex_strategy(),
        char_diffs in any::<bool>(),
        sub_line_moves in any::<bool>(),
    ) {
        let mut opts = CompareOptions::default()
            .with_ignore(IgnoreOptions { regex, ..ignore })
            .with_char_diffs(char_diffs);
        opts.detect_sub_line_moves = sub_line_moves;
        for algorithm in ALGORITHMS {
            let Ok(out) = compare_text(&a, &b, &opts.clone().with_algorithm(algorithm)) else {
                continue;
            };
            for block in &out.blocks {
                prop_assert_eq!(block.changed_a.len(), block.pairs.len());
                prop_assert_eq!(block.changed_b.len(), block.pairs.len());
                for (pair, (ca, cb)) in block.pairs.iter().zip(block.changed_a.iter().zip(&block.changed_b)) {
                    prop_assert_eq!((pair.a, pair.b), (ca.idx, cb.idx));
                }
                for side in [&block.changed_a, &block.changed_b] {
                    let mut seen: Vec<usize> = side.iter().map(|line| line.idx).collect();
                    seen.sort_unstable();
                    seen.dedup();
                    prop_assert_eq!(seen.len(), side.len());
                    for line in side.iter() {
                        prop_assert!(line.changes.iter().all(|r| r.start < r.end));
                        for w in line.changes.windows(2) {
                            prop_assert!(w[0].end <= w[1].start, "{:?}", line.changes);
                        }
                    }
                }
            }
        }
    }

    /// Myers and Fast-Myers produce minimal scripts
    #[test]
    fn line_diff_is_minimal(
        a in prop::collection::vec(0u64..5, 0..40),
        b in prop::collection::vec(0u64..5, 0..40),
    ) {
        let optimal = a.len() + b.len() - 2 * lcs_len(&a, &b);
        for algorithm in [Algorithm::Myers, Algorithm::FastMyers] {
            let ops = diff(algorithm, &a, &b, 512, &Interrupt::never()).unwrap();
            let cost: usize = ops.iter().filter(|op| op.tag != OpTag::Match).map(|op| op.len).sum();
            prop_assert_eq!(cost, optimal, "{:?}", algorithm);
        }
    }

    /// Identical sides compare clean under any ignore rules
    #[test]
    fn identical_sides_have_no_diff(a in text_strategy(), ignore in ignore_strategy()) {
        let opts = CompareOptions::default().with_ignore(ignore);
        match compare_text(&a, &a, &opts) {
            Ok(out) => {
                let s = out.summary;
                prop_assert_eq!((s.added, s.removed, s.changed, s.moved), (0, 0, 0, 0));
                prop_assert_eq!(s.matched, out.alignment.len());
                prop_assert_eq!(out.markers().count(), 0);
            }
            Err(err) => prop_assert_eq!(err.kind(), ErrorKind::EmptyInput),
        }
    }

    /// Whitespace placement is invisible under `all_spaces`
    #[test]
    fn all_spaces_ignores_whitespace(
        lines in prop::collection::vec(prop::collection::vec(("[a-z]{1,4}", "[ \t]{0,3}"), 0..5), 1..12)
    ) {
        let plain: String = lines
            .iter()
            .map(|words| words.iter().map(|(w, _)| w.as_str()).collect::<Vec<_>>().join(" ") + "\n")
            .collect();
        let spaced: String = lines
            .iter()
            .map(|words| words.iter().map(|(w, gap)| format!("{gap}{w}")).collect::<String>() + " \n")
            .collect();
        let ignore = IgnoreOptions { all_spaces: true, ..IgnoreOptions::default() };
        let out = compare_text(&plain, &spaced, &CompareOptions::default().with_ignore(ignore)).unwrap();
        prop_assert_eq!(out.summary.diff_lines, 0);
    }

    /// Letter case is invisible under `case`
    #[test]
    fn case_fold_ignores_case(lines in prop::collection::vec("[a-zA-Z ]{0,10}", 1..12)) {
        let a: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let b = a.to_uppercase();
        let ignore = IgnoreOptions { case: true, ..IgnoreOptions::default() };
        let out = compare_text(&a, &b, &CompareOptions::default().with_ignore(ignore)).unwrap();
        prop_assert_eq!(out.summary.diff_lines, 0);
    }

    /// Repeated runs are equal, whichever strategy drives the line diff
    #[test]
    fn compare_is_deterministic(a in text_strategy(), b in text_strategy(), char_diffs in any::<bool>()) {
        for algorithm in ALGORITHMS {
            let opts = CompareOptions::default().with_algorithm(algorithm).with_char_diffs(char_diffs);
            let first = compare_text(&a, &b, &opts).ok();
            let second = compare_text(&a, &b, &opts).ok();
            prop_assert_eq!(first, second);
        }
    }

    /// A cancelled run leaves nothing behind: the next run matches a clean one
    #[test]
    fn cancellation_is_clean(a in text_strategy(), b in text_strategy(), after in 0usize..4) {
        let (sa, sb) = (MemorySource::new(a), MemorySource::new(b));
        let opts = CompareOptions::default();
        let polls = AtomicUsize::new(0);
        let cancel = || polls.fetch_add(1, Ordering::Relaxed) >= after;
        let cancelled = compare_with(&sa, &sb, &opts, &Interrupt::new(&cancel));
        let clean = compare(&sa, &sb, &opts);
        match cancelled {
            Ok(out) => prop_assert_eq!(Some(out), clean.ok()),
            Err(err) => prop_assert!(err.is_cancelled() || err.kind() == ErrorKind::EmptyInput),
        }
        prop_assert_eq!(compare(&sa, &sb, &opts).ok(), compare(&sa, &sb, &opts).ok());
    }
}
