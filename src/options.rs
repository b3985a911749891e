//! Comparison options.
//!
//! All knobs are plain public fields with defaults matching a typical
//! side-by-side compare; the `with_*` builders are shorthand for hosts that
//! only flip one or two of them.

/// Default minimum dissimilarity (percent) before a line pair counts as
/// delete + insert instead of changed.
const DEFAULT_CHANGED_THRESHOLD: u8 = 20;

/// Default cap on combined occurrences for a histogram anchor.
const DEFAULT_HISTOGRAM_MAX_OCCURRENCES: u32 = 512;

// =============================================================================
// Sides and algorithms
// =============================================================================

/// One of the two compared texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// The main view
    #[default]
    A,
    /// The sub view
    B,
}

impl Side {
    /// The opposite side
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Top-level line diff strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Classic O(ND) with linear-space middle-snake recursion
    Myers,
    /// Iterative O(ND) with a ring buffer and explicit work stack
    #[default]
    FastMyers,
    /// Anchors on the rarest common element, for heavily duplicated input
    Histogram,
}

// =============================================================================
// Ignore options
// =============================================================================

/// Regex-driven ignore rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexIgnore {
    /// Pattern applied to each line's content (EOL excluded)
    pub pattern: String,
    /// When set, matches are the only compared regions instead of the ignored ones
    pub invert: bool,
    /// Keep lines on which the pattern does not match at all
    pub include_nomatch_lines: bool,
    /// Report ignored regions as highlights in the output
    pub highlight_ignores: bool,
}

impl RegexIgnore {
    /// Ignore whatever `pattern` matches.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            invert: false,
            include_nomatch_lines: true,
            highlight_ignores: false,
        }
    }

    /// Compare only what `pattern` matches.
    pub fn only(pattern: impl Into<String>) -> Self {
        Self {
            invert: true,
            ..Self::new(pattern)
        }
    }

    /// Drop lines on which the pattern finds nothing.
    pub fn dropping_nomatch_lines(mut self) -> Self {
        self.include_nomatch_lines = false;
        self
    }

    /// Report ignored regions as highlights.
    pub fn highlighted(mut self) -> Self {
        self.highlight_ignores = true;
        self
    }
}

/// Equivalence rules applied while hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreOptions {
    /// Drop lines with no retained content
    pub empty_lines: bool,
    /// Drop lines the host reports as folded
    pub folded_lines: bool,
    /// Drop lines the host reports as hidden
    pub hidden_lines: bool,
    /// Exclude the line terminator from hashing
    pub eol: bool,
    /// Spaces and tabs contribute nothing
    pub all_spaces: bool,
    /// Runs of spaces and tabs hash as one space
    pub changed_spaces: bool,
    /// Fold letters to lowercase before hashing
    pub case: bool,
    /// Pattern-based region ignore
    pub regex: Option<RegexIgnore>,
}

impl IgnoreOptions {
    /// True when no rule is active.
    pub fn is_strict(&self) -> bool {
        *self == Self::default()
    }

    /// Whether ignored regions should be reported.
    pub fn highlights_ignores(&self) -> bool {
        self.regex.as_ref().is_some_and(|r| r.highlight_ignores)
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Half-open span of document lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSpan {
    /// First included document line
    pub start: usize,
    /// One past the last included document line
    pub end: usize,
}

impl LineSpan {
    /// Create a span, swapping the bounds if given backwards.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Restrict to `0..line_count`.
    pub fn clamp(self, line_count: usize) -> Self {
        Self {
            start: self.start.min(line_count),
            end: self.end.min(line_count),
        }
    }
}

/// Restricts a compare to a region of each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Region of side A
    pub a: LineSpan,
    /// Region of side B
    pub b: LineSpan,
}

impl Selection {
    /// The span for `side`
    pub fn span(&self, side: Side) -> LineSpan {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }
}

// =============================================================================
// CompareOptions
// =============================================================================

/// Configuration for one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Side whose unique lines are reported as added
    pub new_side: Side,
    /// Detect lines moved between unrelated blocks
    pub detect_moves: bool,
    /// Allow the convergence pass that pairs lines inside uneven blocks
    pub detect_sub_block_diffs: bool,
    /// Mark identical change ranges on both lines of a pair as moved
    pub detect_sub_line_moves: bool,
    /// Narrow word replacements with a char-level diff
    pub detect_char_diffs: bool,
    /// Hashing equivalence rules
    pub ignore: IgnoreOptions,
    /// Compare only these regions
    pub selection: Option<Selection>,
    /// Lines less similar than `100 - threshold` percent are not paired
    pub changed_threshold_percent: u8,
    /// Top-level line differ
    pub algorithm: Algorithm,
    /// Histogram anchors must occur fewer times than this across both sides
    pub histogram_max_occurrences: u32,
    /// Upper bound on refinement workers (None = hardware based)
    ///
    /// Each `compare` builds its own pool of this size. Calling `compare`
    /// inside `rayon::ThreadPool::install` runs refinement on that pool
    /// instead and leaves its size to the host.
    pub max_workers: Option<usize>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            new_side: Side::A,
            detect_moves: true,
            detect_sub_block_diffs: true,
            detect_sub_line_moves: true,
            detect_char_diffs: false,
            ignore: IgnoreOptions::default(),
            selection: None,
            changed_threshold_percent: DEFAULT_CHANGED_THRESHOLD,
            algorithm: Algorithm::FastMyers,
            histogram_max_occurrences: DEFAULT_HISTOGRAM_MAX_OCCURRENCES,
            max_workers: None,
        }
    }
}

impl CompareOptions {
    /// Defaults with every ignore rule off.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Defaults that ignore line endings, whitespace amount and case.
    pub fn relaxed() -> Self {
        Self {
            ignore: IgnoreOptions {
                eol: true,
                changed_spaces: true,
                case: true,
                ..IgnoreOptions::default()
            },
            ..Self::default()
        }
    }

    /// Minimum similarity (percent) for a line pair to count as changed.
    pub fn changed_resembl_percent(&self) -> u32 {
        100 - u32::from(self.changed_threshold_percent.min(100))
    }

    /// Set which side is labelled new.
    pub fn with_new_side(mut self, side: Side) -> Self {
        self.new_side = side;
        self
    }

    /// Choose the top-level line differ.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Replace the ignore rules.
    pub fn with_ignore(mut self, ignore: IgnoreOptions) -> Self {
        self.ignore = ignore;
        self
    }

    /// Install a regex ignore rule.
    pub fn with_regex(mut self, regex: RegexIgnore) -> Self {
        self.ignore.regex = Some(regex);
        self
    }

    /// Restrict to a selection on each side.
    pub fn with_selection(mut self, a: LineSpan, b: LineSpan) -> Self {
        self.selection = Some(Selection { a, b });
        self
    }

    /// Toggle char-level narrowing.
    pub fn with_char_diffs(mut self, on: bool) -> Self {
        self.detect_char_diffs = on;
        self
    }

    /// Toggle block move detection.
    pub fn with_moves(mut self, on: bool) -> Self {
        self.detect_moves = on;
        self
    }

    /// Set the changed-line threshold (clamped to 100).
    pub fn with_changed_threshold(mut self, percent: u8) -> Self {
        self.changed_threshold_percent = percent.min(100);
        self
    }

    /// Cap the refinement pool.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers.max(1));
        self
    }
}
