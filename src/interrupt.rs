//! Cooperative cancellation and progress reporting.
//!
//! The engine never blocks and never spawns a watchdog. Long loops poll the
//! caller's `is_cancelled` at a fixed cadence through a [`Ticker`] and unwind
//! with [`CompareError::Cancelled`] as soon as it answers true.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CompareError, CompareResult};

/// Lines extracted between polls.
pub(crate) const EXTRACT_POLL: u32 = 1_000;
/// Snake iterations between polls in the recursive Myers.
pub(crate) const MYERS_POLL: u32 = 3_000;
/// Inner iterations between polls in Fast-Myers.
pub(crate) const FAST_MYERS_POLL: u32 = 300_000;
/// Alignment pairs emitted between polls.
pub(crate) const EMIT_POLL: u32 = 1_000;

fn never_cancelled() -> bool {
    false
}

// =============================================================================
// Progress
// =============================================================================

/// Work counters shared with a UI thread.
///
/// Updated with relaxed ordering; readers only ever see a monotone estimate.
#[derive(Debug, Default)]
pub struct Progress {
    done: AtomicU64,
    total: AtomicU64,
}

impl Progress {
    /// Fresh counters at zero.
    pub const fn new() -> Self {
        Self {
            done: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Units completed so far.
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Units expected overall.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed share in `0.0..=1.0` (0 when nothing is scheduled).
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.done().min(total) as f64) / (total as f64)
    }

    pub(crate) fn add_total(&self, units: u64) {
        self.total.fetch_add(units, Ordering::Relaxed);
    }

    pub(crate) fn advance(&self, units: u64) {
        self.done.fetch_add(units, Ordering::Relaxed);
    }

    /// Zero both counters.
    pub fn reset(&self) {
        self.done.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
    }
}

// =============================================================================
// Interrupt
// =============================================================================

/// Caller-side hooks for one comparison.
#[derive(Clone, Copy)]
pub struct Interrupt<'a> {
    is_cancelled: &'a (dyn Fn() -> bool + Sync),
    progress: Option<&'a Progress>,
}

impl<'a> Interrupt<'a> {
    /// Poll `is_cancelled` at every cooperative point.
    pub fn new(is_cancelled: &'a (dyn Fn() -> bool + Sync)) -> Self {
        Self {
            is_cancelled,
            progress: None,
        }
    }

    /// Never cancels and reports no progress.
    pub fn never() -> Interrupt<'static> {
        Interrupt {
            is_cancelled: &never_cancelled,
            progress: None,
        }
    }

    /// Also publish progress into `progress`.
    pub fn with_progress(mut self, progress: &'a Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fail with `Cancelled` if the caller asked to stop.
    #[inline]
    pub fn check(&self) -> CompareResult<()> {
        if (self.is_cancelled)() {
            Err(CompareError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn progress(&self) -> Option<&'a Progress> {
        self.progress
    }

    pub(crate) fn ticker(&self, interval: u32) -> Ticker<'a> {
        Ticker {
            interrupt: *self,
            interval,
            count: 0,
        }
    }
}

impl std::fmt::Debug for Interrupt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt")
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl Default for Interrupt<'static> {
    fn default() -> Self {
        Self::never()
    }
}

/// Counts work units and polls the interrupt every `interval` of them.
pub(crate) struct Ticker<'a> {
    interrupt: Interrupt<'a>,
    interval: u32,
    count: u32,
}

impl Ticker<'_> {
    /// Count one unit.
    #[inline]
    pub fn tick(&mut self) -> CompareResult<()> {
        self.count += 1;
        if self.count >= self.interval {
            self.count = 0;
            self.interrupt.check()?;
        }
        Ok(())
    }

    /// Count `units` at once.
    #[inline]
    pub fn tick_n(&mut self, units: usize) -> CompareResult<()> {
        let units = u32::try_from(units).unwrap_or(u32::MAX);
        self.count = self.count.saturating_add(units);
        if self.count >= self.interval {
            self.count = 0;
            self.interrupt.check()?;
        }
        Ok(())
    }
}
