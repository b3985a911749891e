//! Error types for sidediff.
//!
//! Every error aborts the comparison that raised it; partial output is dropped
//! before the error reaches the caller. Refinement of a single block is the one
//! place where a failure is absorbed (the block degrades to whole-line changes).

use thiserror::Error;

/// Coarse classification of a [`CompareError`], stable for hosts to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller's `is_cancelled` returned true.
    Cancelled,
    /// The ignore pattern failed to compile.
    BadRegex,
    /// An allocation proportional to the input failed.
    OutOfMemory,
    /// Both sides were empty after filtering.
    EmptyInput,
}

/// Errors that can occur during a comparison.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Cooperative cancellation was observed at a poll point.
    #[error("comparison cancelled")]
    Cancelled,

    /// The `ignore_regex` pattern is invalid.
    #[error("invalid ignore pattern `{pattern}`: {message}")]
    BadRegex {
        /// The pattern as supplied by the caller
        pattern: String,
        /// The regex engine's explanation, suitable for surfacing to users
        message: String,
    },

    /// Reserving memory for a buffer failed.
    #[error("out of memory while {context}")]
    OutOfMemory {
        /// What the engine was allocating
        context: &'static str,
    },

    /// Nothing left to compare once ignores were applied.
    #[error("nothing to compare: both sides are empty after filtering")]
    EmptyInput,
}

/// Result type alias for comparison operations.
pub type CompareResult<T> = Result<T, CompareError>;

impl CompareError {
    /// Map this error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::BadRegex { .. } => ErrorKind::BadRegex,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::EmptyInput => ErrorKind::EmptyInput,
        }
    }

    /// Create a bad-pattern error from a regex compile failure.
    pub fn bad_regex(pattern: impl Into<String>, err: &regex::Error) -> Self {
        Self::BadRegex {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }

    /// Create an allocation failure error.
    pub fn out_of_memory(context: &'static str) -> Self {
        Self::OutOfMemory { context }
    }

    /// True for [`CompareError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Allocate an empty vector with room for `capacity` items, failing softly.
pub(crate) fn try_vec<T>(capacity: usize, context: &'static str) -> CompareResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| CompareError::out_of_memory(context))?;
    Ok(v)
}

/// Allocate a vector of `len` copies of `value`, failing softly.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T, context: &'static str) -> CompareResult<Vec<T>> {
    let mut v = try_vec(len, context)?;
    v.resize(len, value);
    Ok(v)
}
