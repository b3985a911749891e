//! Iterative Myers diff over a ring buffer.
//!
//! Same O(ND) search as [`super::myers`], but the forward and reverse rows
//! share a circular buffer of `2 * (min(N, M) + 1)` slots and the recursion
//! is replaced by an explicit work stack, so deep inputs never grow the call
//! stack.

use std::ops::Range;

use tracing::trace;

use crate::element::DiffElement;
use crate::error::{CompareResult, try_filled, try_vec};
use crate::interrupt::{FAST_MYERS_POLL, Interrupt, Ticker};

use super::myers::{common_prefix_len, common_suffix_len};
use super::script::ScriptBuilder;

/// Pending work, processed in script order.
enum Task {
    Diff(Range<usize>, Range<usize>),
    Equal(usize),
}

/// Middle snake `(x, y) -> (u, v)` of a region, and the region's edit cost.
struct Snake {
    cost: isize,
    x: usize,
    y: usize,
    u: usize,
    v: usize,
}

/// Append the shortest edit script between `a` and `b` to `out`.
pub(crate) fn diff_into<E: DiffElement>(
    a: &[E],
    b: &[E],
    out: &mut ScriptBuilder,
    interrupt: &Interrupt<'_>,
) -> CompareResult<()> {
    let ring = 2 * a.len().min(b.len()) + 2;
    let mut fwd: Vec<isize> = try_filled(ring, 0, "allocating Fast-Myers ring buffer")?;
    let mut rev: Vec<isize> = try_filled(ring, 0, "allocating Fast-Myers ring buffer")?;
    let mut ticker = interrupt.ticker(FAST_MYERS_POLL);

    let mut stack = try_vec(64, "allocating Fast-Myers stack")?;
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
        // Both ends differ after trimming, so the cost is at least 2 and each
        // half of the split is strictly cheaper than the whole
        match middle_snake(&a[ar.clone()], &b[br.clone()], &mut fwd, &mut rev, &mut ticker)? {
            Some(snake) if snake.cost > 1 || snake.u > snake.x => {
                stack.push(Task::Diff(ar.start + snake.u..ar.end, br.start + snake.v..br.end));
                stack.push(Task::Equal(snake.u - snake.x));
                stack.push(Task::Diff(ar.start..ar.start + snake.x, br.start..br.start + snake.y));
            }
            _ => {
                trace!(n = ar.len(), m = br.len(), "no usable snake, emitting replacement");
                out.delete(ar.len());
                out.insert(br.len());
            }
        }
    }
    Ok(())
}

#[inline]
fn key_at<E: DiffElement>(s: &[E], forward: bool, len: isize, i: isize) -> u64 {
    if forward {
        s[i as usize].key()
    } else {
        s[(len - i - 1) as usize].key()
    }
}

/// Find the middle snake of `e` vs `f` (both non-empty).
fn middle_snake<E: DiffElement>(
    e: &[E],
    f: &[E],
    fwd: &mut [isize],
    rev: &mut [isize],
    ticker: &mut Ticker<'_>,
) -> CompareResult<Option<Snake>> {
    let n = e.len() as isize;
    let m = f.len() as isize;
    let l = n + m;
    let z = 2 * n.min(m) + 2;
    let w = n - m;
    let slot = |k: isize| k.rem_euclid(z) as usize;

    fwd[..z as usize].fill(0);
    rev[..z as usize].fill(0);

    let h_max = l / 2 + l % 2;
    for h in 0..=h_max {
        for forward in [true, false] {
            let (c, d): (&mut [isize], &[isize]) = if forward {
                (&mut *fwd, &*rev)
            } else {
                (&mut *rev, &*fwd)
            };
            let o = isize::from(forward);

            let mut k = -(h - 2 * (h - m).max(0));
            let k_hi = h - 2 * (h - n).max(0);
            while k <= k_hi {
                ticker.tick()?;
                let mut a = if k == -h || (k != h && c[slot(k - 1)] < c[slot(k + 1)]) {
                    c[slot(k + 1)]
                } else {
                    c[slot(k - 1)] + 1
                };
                let mut b = a - k;
                let (s, t) = (a, b);
                while a < n && b >= 0 && b < m && key_at(e, forward, n, a) == key_at(f, forward, m, b) {
                    a += 1;
                    b += 1;
                }
                c[slot(k)] = a;

                let zz = -(k - w);
                if l % 2 == o && zz >= -(h - o) && zz <= h - o && c[slot(k)] + d[slot(zz)] >= n {
                    let snake = if forward {
                        Snake {
                            cost: 2 * h - 1,
                            x: s as usize,
                            y: t as usize,
                            u: a as usize,
                            v: b as usize,
                        }
                    } else {
                        Snake {
                            cost: 2 * h,
                            x: (n - a) as usize,
                            y: (m - b) as usize,
                            u: (n - s) as usize,
                            v: (m - t) as usize,
                        }
                    };
                    return Ok(Some(snake));
                }
                k += 2;
            }
        }
    }
    Ok(None)
}
