//! Myers diff with linear-space refinement.
//!
//! Implements the O(ND) algorithm from Myers' paper, recursing on the middle
//! snake (Hirschberg-style) so that memory stays O(N+M) regardless of the
//! edit distance.
//!
//! # Implementation Notes
//!
//! - Common prefix/suffix are stripped at every level of the recursion
//! - The forward and backward `V` rows are allocated once per call and reused
//!   by every level
//! - No cap on `D`: the search always runs to the optimal path
//!
//! # References
//!
//! - Myers, E.W. "An O(ND) Difference Algorithm and Its Variations" (1986)

use std::ops::{Index, IndexMut, Range};

use tracing::trace;

use crate::element::DiffElement;
use crate::error::{CompareResult, try_filled};
use crate::interrupt::{Interrupt, MYERS_POLL, Ticker};

use super::script::ScriptBuilder;

// =============================================================================
// V array
// =============================================================================

/// Furthest-reaching x per diagonal, indexed by `k` in `-max_d..=max_d`.
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> CompareResult<Self> {
        Ok(Self {
            offset: max_d as isize,
            v: try_filled(2 * max_d + 1, 0, "allocating Myers V rows")?,
        })
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

// =============================================================================
// Main API
// =============================================================================

/// Append the shortest edit script between `a` and `b` to `out`.
pub(crate) fn diff_into<E: DiffElement>(
    a: &[E],
    b: &[E],
    out: &mut ScriptBuilder,
    interrupt: &Interrupt<'_>,
) -> CompareResult<()> {
    let d = max_d(a.len(), b.len());
    let mut vf = V::new(d)?;
    let mut vb = V::new(d)?;
    let mut ticker = interrupt.ticker(MYERS_POLL);
    conquer(a, 0..a.len(), b, 0..b.len(), &mut vf, &mut vb, out, &mut ticker)
}

pub(crate) fn common_prefix_len<E: DiffElement>(a: &[E], ar: Range<usize>, b: &[E], br: Range<usize>) -> usize {
    a[ar]
        .iter()
        .zip(&b[br])
        .take_while(|(x, y)| x.key() == y.key())
        .count()
}

pub(crate) fn common_suffix_len<E: DiffElement>(a: &[E], ar: Range<usize>, b: &[E], br: Range<usize>) -> usize {
    a[ar]
        .iter()
        .rev()
        .zip(b[br].iter().rev())
        .take_while(|(x, y)| x.key() == y.key())
        .count()
}

// =============================================================================
// Myers Algorithm Core
// =============================================================================

/// Find the start of the middle snake of `a[ar]` vs `b[br]`.
///
/// Both ranges must be non-empty.
fn find_middle_snake<E: DiffElement>(
    a: &[E],
    ar: Range<usize>,
    b: &[E],
    br: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    ticker: &mut Ticker<'_>,
) -> CompareResult<Option<(usize, usize)>> {
    let n = ar.len();
    let m = br.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = max_d(n, m) as isize;
    for d in 0..d_max {
        // Forward path
        for k in (-d..=d).rev().step_by(2) {
            ticker.tick()?;
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(a, ar.start + x..ar.end, b, br.start + y..br.end);
            }
            vf[k] = x;
            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Ok(Some((x0 + ar.start, y0 + br.start)));
            }
        }

        // Backward path
        for k in (-d..=d).rev().step_by(2) {
            ticker.tick()?;
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(a, ar.start..ar.start + n - x, b, br.start..br.start + m - y);
                x += advance;
                y += advance;
            }
            vb[k] = x;
            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Ok(Some((n - x + ar.start, m - y + br.start)));
            }
        }
    }

    Ok(None)
}

#[allow(clippy::too_many_arguments)]
fn conquer<E: DiffElement>(
    a: &[E],
    mut ar: Range<usize>,
    b: &[E],
    mut br: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    out: &mut ScriptBuilder,
    ticker: &mut Ticker<'_>,
) -> CompareResult<()> {
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
    } else if let Some((x, y)) = find_middle_snake(a, ar.clone(), b, br.clone(), vf, vb, ticker)? {
        conquer(a, ar.start..x, b, br.start..y, vf, vb, out, ticker)?;
        conquer(a, x..ar.end, b, y..br.end, vf, vb, out, ticker)?;
    } else {
        trace!(n = ar.len(), m = br.len(), "no middle snake, emitting replacement");
        out.delete(ar.len());
        out.insert(br.len());
    }

    out.equal(suffix);
    Ok(())
}
