//! Regex-driven region ignore.

use regex::bytes::Regex;
use smallvec::SmallVec;

use crate::error::{CompareError, CompareResult};
use crate::model::Range;
use crate::options::RegexIgnore;

/// Ignored byte spans of one line, ascending and disjoint.
pub(crate) type Spans = SmallVec<[Range; 2]>;

/// A compiled [`RegexIgnore`].
#[derive(Debug, Clone)]
pub(crate) struct IgnoreFilter {
    regex: Regex,
    invert: bool,
    include_nomatch_lines: bool,
}

impl IgnoreFilter {
    pub fn compile(rule: &RegexIgnore) -> CompareResult<Self> {
        let regex = Regex::new(&rule.pattern).map_err(|e| CompareError::bad_regex(&rule.pattern, &e))?;
        Ok(Self {
            regex,
            invert: rule.invert,
            include_nomatch_lines: rule.include_nomatch_lines,
        })
    }

    /// Spans of `content` (EOL excluded) that must not be compared.
    ///
    /// `None` means the whole line is dropped from the side.
    pub fn ignored(&self, content: &[u8]) -> Option<Spans> {
        let mut matches = self.regex.find_iter(content).peekable();
        if matches.peek().is_none() {
            return self.include_nomatch_lines.then(Spans::new);
        }

        let mut spans = Spans::new();
        if self.invert {
            let mut cursor = 0;
            for m in matches {
                if m.start() > cursor {
                    spans.push(Range::new(cursor, m.start()));
                }
                cursor = cursor.max(m.end());
            }
            if cursor < content.len() {
                spans.push(Range::new(cursor, content.len()));
            }
        } else {
            spans.extend(
                matches
                    .filter(|m| !m.is_empty())
                    .map(|m| Range::new(m.start(), m.end())),
            );
        }
        Some(spans)
    }
}

/// True when byte `pos` falls in one of `spans`.
#[inline]
pub(crate) fn in_spans(spans: &[Range], pos: usize) -> bool {
    spans.iter().any(|s| s.contains(pos))
}
