//! sidediff - Structural side-by-side text comparison
//!
//! ## Core Concepts
//!
//! **Three granularities**: lines are diffed first, replacement blocks are then
//! refined into changed line pairs, and each pair is narrowed to word and
//! character ranges.
//!
//! **Logical lines**: ignore rules (blank, folded, hidden, regex) remove lines
//! before diffing. Every index inside the engine is a logical line; every line
//! number handed back to the host is a document line.
//!
//! ## Modules
//! - `extract`: hashing of lines, words and chars under the ignore rules
//! - `algo`: Myers, Fast-Myers and Histogram diffs plus boundary shifting
//! - `post`: replacement blocks, move detection, unique-line tagging
//! - `refine`: line pairing and sub-line ranges (parallel with `parallel`)
//! - `emit`: alignment rows, marker masks and summary counts
//!
//! ## Usage
//!
//! ```
//! use sidediff::{CompareOptions, MemorySource, compare};
//!
//! let old = MemorySource::new("foo\nbar\n");
//! let new = MemorySource::new("foo\nbaz\nbar\n");
//! let out = compare(&old, &new, &CompareOptions::default()).unwrap();
//!
//! assert_eq!(out.summary.matched, 2);
//! assert_eq!(out.summary.diff_lines, 1);
//! for (side, line, mask) in out.markers() {
//!     println!("{side:?}:{line} {mask:?}");
//! }
//! ```

// =============================================================================
// Pipeline stages
// =============================================================================

/// Line, word and char extraction
pub mod extract;

/// Diff algorithms and edit scripts
pub mod algo;

/// Blocks, moves and unique lines
pub mod post;

mod refine;

/// Alignment rows and markers
pub mod emit;

mod engine;

// =============================================================================
// Shared types
// =============================================================================

/// Error types
pub mod error;

/// Stable hashing
pub mod hash;

/// Element types fed to the diff algorithms
pub mod element;

/// Result data model
pub mod model;

/// Comparison options
pub mod options;

/// Host text sources
pub mod source;

/// Cancellation and progress
pub mod interrupt;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{CompareOutput, compare, compare_with};

pub use emit::{MarkerMask, iter_markers, iter_sub_line_changes};

pub use error::{CompareError, CompareResult, ErrorKind};

pub use interrupt::{Interrupt, Progress};

pub use model::{
    AlignSide, AlignmentPair, ChangeKind, ChangedLine, ChangedRange, CompareSummary, DiffBlock,
    LinePair, MoveRange, PerSide, Range,
};

pub use options::{Algorithm, CompareOptions, IgnoreOptions, LineSpan, RegexIgnore, Selection, Side};

pub use source::{MemorySource, TextSource, Visibility};
