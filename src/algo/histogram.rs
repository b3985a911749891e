//! Histogram diff.
//!
//! Splits each region on its rarest common element, extended to the longest
//! run of equal elements around it. Unique tokens (function signatures,
//! section headers) become anchors, which keeps structured text readable
//! where plain Myers would align on frequent lines such as `}`.

use std::ops::Range;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::element::DiffElement;
use crate::error::{CompareResult, try_filled, try_vec};
use crate::interrupt::{Interrupt, MYERS_POLL, Ticker};

use super::myers::{self, common_prefix_len, common_suffix_len};
use super::script::ScriptBuilder;

const NONE: usize = usize::MAX;

enum Task {
    Diff(Range<usize>, Range<usize>),
    Equal(usize),
}

/// Outcome of the anchor search for one region.
enum Anchor {
    /// Equal run `a[a_pos..a_pos + len]` == `b[b_pos..b_pos + len]`
    Found { a_pos: usize, b_pos: usize, len: usize },
    /// The two regions share no element at all
    NoCommon,
    /// Every common element occurs too often to be an anchor
    TooFrequent,
}

#[derive(Debug, Clone, Copy)]
struct Occurrences {
    count_a: u32,
    count_b: u32,
    /// First index in A; further ones follow the `next` chain
    first_a: usize,
}

/// Append a histogram diff of `a` and `b` to `out`.
pub(crate) fn diff_into<E: DiffElement>(
    a: &[E],
    b: &[E],
    max_occurrences: u32,
    out: &mut ScriptBuilder,
    interrupt: &Interrupt<'_>,
) -> CompareResult<()> {
    let mut next: Vec<usize> = try_filled(a.len(), NONE, "allocating histogram chains")?;
    let mut ticker = interrupt.ticker(MYERS_POLL);
    let mut stack = try_vec(64, "allocating histogram stack")?;
    stack.push(Task::Diff(0..a.len(), 0..b.len()));

    while let Some(task) = stack.pop() {
        let (mut ar, mut br) = match task {
            Task::Equal(len) => {
                out.equal(len);
                continue;
            }
            Task::Diff(ar, br) => (ar, br),
        };

        let prefix = common_prefix_len(a, ar.clone(), b, br.clone());
        out.equal(prefix);
        ar.start += prefix;
        br.start += prefix;
        let suffix = common_suffix_len(a, ar.clone(), b, br.clone());
        ar.end -= suffix;
        br.end -= suffix;

        if ar.is_empty() || br.is_empty() {
            out.delete(ar.len());
            out.insert(br.len());
            out.equal(suffix);
            continue;
        }

        stack.push(Task::Equal(suffix));
        match find_anchor(a, ar.clone(), b, br.clone(), max_occurrences, &mut next, &mut ticker)? {
            Anchor::Found { a_pos, b_pos, len } => {
                stack.push(Task::Diff(a_pos + len..ar.end, b_pos + len..br.end));
                stack.push(Task::Equal(len));
                stack.push(Task::Diff(ar.start..a_pos, br.start..b_pos));
            }
            Anchor::NoCommon => {
                out.delete(ar.len());
                out.insert(br.len());
            }
            Anchor::TooFrequent => {
                trace!(n = ar.len(), m = br.len(), "no anchor under threshold, falling back to Myers");
                myers::diff_into(&a[ar], &b[br], out, interrupt)?;
            }
        }
    }
    Ok(())
}

fn find_anchor<E: DiffElement>(
    a: &[E],
    ar: Range<usize>,
    b: &[E],
    br: Range<usize>,
    max_occurrences: u32,
    next: &mut [usize],
    ticker: &mut Ticker<'_>,
) -> CompareResult<Anchor> {
    ticker.tick_n(ar.len() + br.len())?;
    let mut table: FxHashMap<u64, Occurrences> = FxHashMap::default();
    for i in ar.clone().rev() {
        let occ = table.entry(a[i].key()).or_insert(Occurrences {
            count_a: 0,
            count_b: 0,
            first_a: NONE,
        });
        next[i] = occ.first_a;
        occ.first_a = i;
        occ.count_a += 1;
    }
    for j in br.clone() {
        if let Some(occ) = table.get_mut(&b[j].key()) {
            occ.count_b += 1;
        }
    }

    // Rarest common element; ties go to the earliest position in B
    let mut common = false;
    let mut best: Option<(u32, usize)> = None;
    for j in br.clone() {
        let Some(occ) = table.get(&b[j].key()) else {
            continue;
        };
        common = true;
        let combined = occ.count_a + occ.count_b;
        if combined < max_occurrences && best.is_none_or(|(count, _)| combined < count) {
            best = Some((combined, j));
        }
    }
    let Some((_, j)) = best else {
        return Ok(if common { Anchor::TooFrequent } else { Anchor::NoCommon });
    };

    // Longest equal run through any A occurrence of the anchor
    let mut found = (0, 0, 0);
    let mut i = table.get(&b[j].key()).map_or(NONE, |occ| occ.first_a);
    while i != NONE {
        ticker.tick()?;
        let mut back = 0;
        while i - back > ar.start && j - back > br.start && a[i - back - 1].key() == b[j - back - 1].key() {
            back += 1;
        }
        let mut fwd = 1;
        while i + fwd < ar.end && j + fwd < br.end && a[i + fwd].key() == b[j + fwd].key() {
            fwd += 1;
        }
        if back + fwd > found.2 {
            found = (i - back, j - back, back + fwd);
        }
        i = next[i];
    }

    let (a_pos, b_pos, len) = found;
    Ok(Anchor::Found { a_pos, b_pos, len })
}
