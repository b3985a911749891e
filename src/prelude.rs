//! Prelude module for common imports.
//!
//! ```
//! use sidediff::prelude::*;
//! ```

// Entry points
pub use crate::engine::{CompareOutput, compare, compare_with};

// Options
pub use crate::options::{
    Algorithm, CompareOptions, IgnoreOptions, LineSpan, RegexIgnore, Selection, Side,
};

// Host collaborators
pub use crate::interrupt::{Interrupt, Progress};
pub use crate::source::{MemorySource, TextSource, Visibility};

// Results
pub use crate::emit::{MarkerMask, iter_markers, iter_sub_line_changes};
pub use crate::model::{
    AlignSide, AlignmentPair, ChangeKind, ChangedLine, ChangedRange, CompareSummary, DiffBlock,
    PerSide,
};

// Algorithms
pub use crate::algo::{EditOp, OpTag, diff};

// Error
pub use crate::error::{CompareError, CompareResult, ErrorKind};
