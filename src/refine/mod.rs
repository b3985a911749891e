//! Refinement of replacement blocks into changed line pairs.
//!
//! - `linear`: positional pairing when both sides have as many lines
//! - `converge`: similarity-driven pairing for everything else
//! - `words`: word and char ranges of one pair
//!
//! Blocks are independent, so with the `parallel` feature they are spread
//! over a rayon pool built for the call, or over the caller's pool when
//! `compare` runs inside `ThreadPool::install`. A block whose refinement fails keeps its
//! lines whole; only cancellation aborts the pass.

mod converge;
mod linear;
mod words;

pub(crate) use words::merge_ignored;

use tracing::{debug, warn};

use crate::error::CompareResult;
use crate::extract::SideLines;
use crate::interrupt::Interrupt;
use crate::model::{DiffBlock, LinePair};
use crate::options::{CompareOptions, Side};

use words::PairDiff;

/// Everything a refinement worker reads.
#[derive(Clone, Copy)]
pub(crate) struct RefineCtx<'a, 's> {
    pub a: &'a SideLines<'s>,
    pub b: &'a SideLines<'s>,
    pub opts: &'a CompareOptions,
    pub interrupt: Interrupt<'a>,
}

/// Refine every replacement block in place. Returns the number of pairs.
pub(crate) fn refine_blocks(blocks: &mut [DiffBlock], ctx: &RefineCtx<'_, '_>) -> CompareResult<usize> {
    let targets = blocks.iter().filter(|b| b.is_replacement()).count();
    if let Some(progress) = ctx.interrupt.progress() {
        progress.add_total(targets as u64);
    }
    let workers = worker_count(ctx.opts.max_workers);
    debug!(blocks = targets, workers, "refining replacements");

    if workers > 1 && targets > 1 {
        refine_parallel(blocks, ctx, workers)?;
    } else {
        refine_serial(blocks, ctx)?;
    }

    let pairs = blocks.iter().map(|b| b.pairs.len()).sum();
    debug!(pairs, "refined");
    Ok(pairs)
}

/// Hardware threads minus two, at least one, capped by `max_workers`.
fn worker_count(max_workers: Option<usize>) -> usize {
    let hardware = std::thread::available_parallelism().map_or(1, |n| n.get());
    let workers = hardware.saturating_sub(2).max(1);
    max_workers.map_or(workers, |cap| workers.min(cap.max(1)))
}

fn refine_serial(blocks: &mut [DiffBlock], ctx: &RefineCtx<'_, '_>) -> CompareResult<()> {
    blocks
        .iter_mut()
        .filter(|b| b.is_replacement())
        .try_for_each(|block| refine_one(block, ctx))
}

#[cfg(feature = "parallel")]
fn refine_parallel(blocks: &mut [DiffBlock], ctx: &RefineCtx<'_, '_>, workers: usize) -> CompareResult<()> {
    use rayon::prelude::*;

    let run = |blocks: &mut [DiffBlock]| {
        blocks
            .par_iter_mut()
            .filter(|b| b.is_replacement())
            .try_for_each(|block| refine_one(block, ctx))
    };

    // Inside a host's `ThreadPool::install` the host's pool is reused
    if rayon::current_thread_index().is_some() {
        return run(blocks);
    }
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| run(blocks)),
        Err(err) => {
            warn!(error = %err, "cannot build refinement pool, running serially");
            refine_serial(blocks, ctx)
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn refine_parallel(blocks: &mut [DiffBlock], ctx: &RefineCtx<'_, '_>, _workers: usize) -> CompareResult<()> {
    refine_serial(blocks, ctx)
}

/// Refine one block, degrading to whole lines on any error but cancellation.
fn refine_one(block: &mut DiffBlock, ctx: &RefineCtx<'_, '_>) -> CompareResult<()> {
    ctx.interrupt.check()?;
    if let Err(err) = refine_block(block, ctx) {
        if err.is_cancelled() {
            return Err(err);
        }
        warn!(a = block.a.s, b = block.b.s, error = %err, "refinement failed, keeping whole lines");
        block.clear_refinement();
    }
    if let Some(progress) = ctx.interrupt.progress() {
        progress.advance(1);
    }
    Ok(())
}

/// Lines of `side` in `block` that are not part of a move.
fn candidates(block: &DiffBlock, side: Side) -> Vec<usize> {
    let range = match side {
        Side::A => block.a,
        Side::B => block.b,
    };
    (range.s..range.e).filter(|&idx| block.move_at(side, idx).is_none()).collect()
}

fn refine_block(block: &mut DiffBlock, ctx: &RefineCtx<'_, '_>) -> CompareResult<()> {
    block.clear_refinement();
    let lines_a = candidates(block, Side::A);
    let lines_b = candidates(block, Side::B);
    if lines_a.is_empty() || lines_b.is_empty() {
        return Ok(());
    }

    let threshold = ctx.opts.changed_resembl_percent();
    let sub_block = ctx.opts.detect_sub_block_diffs;
    let diffs = if lines_a.len() == lines_b.len() {
        let diffs = linear::refine_linear(ctx, &lines_a, &lines_b)?;
        if sub_block && lines_a.len() > 1 && diffs.iter().any(|d| d.similarity < threshold) {
            converge::refine_converge(ctx, &lines_a, &lines_b)?
        } else {
            diffs
        }
    } else if sub_block {
        converge::refine_converge(ctx, &lines_a, &lines_b)?
    } else {
        Vec::new()
    };

    for PairDiff { a, b, similarity } in diffs {
        if similarity < threshold {
            continue;
        }
        block.pairs.push(LinePair { a: a.idx, b: b.idx });
        block.changed_a.push(a);
        block.changed_b.push(b);
    }
    debug_assert_eq!(block.changed_a.len(), block.pairs.len());
    debug_assert_eq!(block.changed_b.len(), block.pairs.len());
    Ok(())
}
