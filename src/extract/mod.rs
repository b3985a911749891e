//! Element extraction (lines, words, chars) under the active ignore rules.
//!
//! Lines are extracted eagerly once per side. Words and chars are produced on
//! demand for the lines a refinement pass actually looks at.

mod filter;
mod tokens;

pub use tokens::CharClass;

pub(crate) use filter::{IgnoreFilter, Spans};
pub(crate) use tokens::HashRules;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::element::{CharElem, LineElem, WordElem};
use crate::error::{CompareError, CompareResult, try_vec};
use crate::hash::StableHasher;
use crate::interrupt::{EXTRACT_POLL, Interrupt};
use crate::model::Range;
use crate::options::{IgnoreOptions, LineSpan};
use crate::source::{TextSource, Visibility, split_eol};

use filter::in_spans;
use tokens::Scalars;

// =============================================================================
// SideLines
// =============================================================================

/// The logical lines of one side plus on-demand tokenizers for them.
pub(crate) struct SideLines<'s> {
    source: &'s dyn TextSource,
    rules: HashRules,
    lines: Vec<LineElem>,
    /// Regex-ignored byte spans, keyed by logical line
    ignored: FxHashMap<usize, Spans>,
    /// One past the last compared document line
    end_doc: usize,
}

impl<'s> SideLines<'s> {
    /// Hash every surviving line of `source` inside `span` (all lines if `None`).
    pub fn extract(
        source: &'s dyn TextSource,
        span: Option<LineSpan>,
        ignore: &IgnoreOptions,
        filter: Option<&IgnoreFilter>,
        interrupt: &Interrupt<'_>,
    ) -> CompareResult<Self> {
        let count = source.line_count();
        let span = span.unwrap_or(LineSpan { start: 0, end: count }).clamp(count);
        if u32::try_from(span.end).is_err() {
            return Err(CompareError::out_of_memory("indexing more than u32::MAX lines"));
        }

        let rules = HashRules::from_options(ignore);
        let mut lines = try_vec(span.end - span.start, "extracting lines")?;
        let mut ignored = FxHashMap::default();
        let mut ticker = interrupt.ticker(EXTRACT_POLL);
        if let Some(progress) = interrupt.progress() {
            progress.add_total((span.end - span.start) as u64);
        }

        for doc_line in span.start..span.end {
            ticker.tick()?;
            if let Some(progress) = interrupt.progress() {
                progress.advance(1);
            }

            match source.visibility(doc_line) {
                Visibility::Folded if ignore.folded_lines => continue,
                Visibility::Hidden if ignore.hidden_lines => continue,
                _ => {}
            }

            let (content, eol) = split_eol(source.line(doc_line));
            let spans = match filter {
                Some(filter) => match filter.ignored(content) {
                    Some(spans) => spans,
                    None => continue,
                },
                None => Spans::new(),
            };

            let (hash, blank) = hash_line(&rules, content, eol, &spans);
            if blank && ignore.empty_lines {
                continue;
            }
            if !spans.is_empty() {
                ignored.insert(lines.len(), spans);
            }
            lines.push(LineElem {
                doc_line: doc_line as u32,
                hash,
                blank,
            });
        }

        debug!(
            lines = lines.len(),
            skipped = span.end - span.start - lines.len(),
            "extracted side"
        );
        Ok(Self {
            source,
            rules,
            lines,
            ignored,
            end_doc: span.end,
        })
    }

    #[inline]
    pub fn lines(&self) -> &[LineElem] {
        &self.lines
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Document line of logical line `idx`.
    #[inline]
    pub fn doc_line(&self, idx: usize) -> usize {
        self.lines[idx].doc_line as usize
    }

    /// Document line a cursor at logical `idx` points to; past the end this
    /// is one past the last compared line.
    #[inline]
    pub fn cursor_doc(&self, idx: usize) -> usize {
        self.lines
            .get(idx)
            .map_or(self.end_doc, |l| l.doc_line as usize)
    }

    /// Raw bytes of logical line `idx` including its terminator.
    pub fn raw(&self, idx: usize) -> &'s [u8] {
        self.source.line(self.doc_line(idx))
    }

    /// Regex-ignored spans of logical line `idx`.
    pub fn ignored_spans(&self, idx: usize) -> &[Range] {
        self.ignored.get(&idx).map(|s| s.as_slice()).unwrap_or(&[])
    }

    /// Logical lines carrying ignored spans, ascending.
    pub fn lines_with_ignores(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = self.ignored.keys().copied().collect();
        idx.sort_unstable();
        idx
    }

    /// Append the words of logical line `idx` to `out`.
    pub fn words(&self, idx: usize, out: &mut Vec<WordElem>) {
        let raw = self.raw(idx);
        let (content, eol) = split_eol(raw);
        let spans = self.ignored_spans(idx);
        let line_index = idx as u32;

        let mut run: Option<WordRun> = None;
        for (pos, len, c) in Scalars::new(content) {
            if in_spans(spans, pos) {
                if let Some(word) = run.take() {
                    word.flush(&self.rules, content, line_index, out);
                }
                continue;
            }
            let class = CharClass::of(c);
            if !run.as_ref().is_some_and(|w| w.class == class) {
                if let Some(word) = run.take() {
                    word.flush(&self.rules, content, line_index, out);
                }
                run = Some(WordRun::start(class, pos));
            }
            if let Some(word) = run.as_mut() {
                word.push(&self.rules, pos + len, c);
            }
        }
        if let Some(word) = run {
            word.flush(&self.rules, content, line_index, out);
        }

        if self.rules.hash_eol && !eol.is_empty() {
            let mut hasher = StableHasher::new();
            for &b in eol {
                hasher.write_char(char::from(b));
            }
            out.push(WordElem {
                line_index,
                byte_off: content.len() as u32,
                byte_len: eol.len() as u32,
                hash: hasher.finish(),
            });
        }
    }

    /// Append the chars of logical line `idx` within bytes `start..end`.
    ///
    /// Under `changed_spaces` a whitespace run becomes a single element that
    /// spans the whole run.
    pub fn chars(&self, idx: usize, start: usize, end: usize, out: &mut Vec<CharElem>) {
        let raw = self.raw(idx);
        let (content, _) = split_eol(raw);
        let limit = if self.rules.hash_eol { raw.len() } else { content.len() };
        let spans = self.ignored_spans(idx);

        let mut space_run: Option<usize> = None;
        for (pos, len, c) in Scalars::range(raw, start, end.min(limit)) {
            let in_content = pos < content.len();
            if in_content && in_spans(spans, pos) {
                space_run = None;
                continue;
            }
            if in_content && CharClass::of(c) == CharClass::Space {
                if self.rules.all_spaces {
                    continue;
                }
                if self.rules.changed_spaces {
                    match space_run {
                        Some(i) => out[i].byte_len = (pos + len) as u32 - out[i].byte_pos,
                        None => {
                            space_run = Some(out.len());
                            out.push(CharElem {
                                byte_pos: pos as u32,
                                byte_len: len as u32,
                                hash: u32::from(' '),
                            });
                        }
                    }
                    continue;
                }
            }
            space_run = None;
            out.push(CharElem {
                byte_pos: pos as u32,
                byte_len: len as u32,
                hash: u32::from(self.rules.fold_char(c)),
            });
        }
    }
}

/// A word being accumulated.
struct WordRun {
    class: CharClass,
    start: usize,
    end: usize,
    hasher: StableHasher,
}

impl WordRun {
    fn start(class: CharClass, start: usize) -> Self {
        Self {
            class,
            start,
            end: start,
            hasher: StableHasher::new(),
        }
    }

    fn push(&mut self, rules: &HashRules, end: usize, c: char) {
        self.end = end;
        rules.feed(&mut self.hasher, c);
    }

    fn flush(self, rules: &HashRules, content: &[u8], line_index: u32, out: &mut Vec<WordElem>) {
        let hash = if self.class == CharClass::Space {
            match rules.space_run_hash(&content[self.start..self.end]) {
                Some(hash) => hash,
                None => return,
            }
        } else {
            self.hasher.finish()
        };
        out.push(WordElem {
            line_index,
            byte_off: self.start as u32,
            byte_len: (self.end - self.start) as u32,
            hash,
        });
    }
}

/// Hash one line's retained content. Returns `(hash, blank)`.
fn hash_line(rules: &HashRules, content: &[u8], eol: &[u8], spans: &[Range]) -> (u64, bool) {
    let mut hasher = StableHasher::new();
    let mut retained = false;
    let mut in_space_run = false;

    for (pos, _, c) in Scalars::new(content) {
        if in_spans(spans, pos) {
            continue;
        }
        if CharClass::of(c) == CharClass::Space {
            if rules.all_spaces {
                continue;
            }
            if rules.changed_spaces {
                if !in_space_run {
                    hasher.write_char(' ');
                    in_space_run = true;
                    retained = true;
                }
                continue;
            }
        } else {
            in_space_run = false;
        }
        rules.feed(&mut hasher, c);
        retained = true;
    }

    if rules.hash_eol {
        for &b in eol {
            hasher.write_char(char::from(b));
        }
    }
    (hasher.finish(), !retained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegexIgnore;
    use crate::source::MemorySource;

    fn extract<'s>(src: &'s MemorySource, ignore: &IgnoreOptions) -> SideLines<'s> {
        let filter = ignore
            .regex
            .as_ref()
            .map(|r| IgnoreFilter::compile(r).unwrap());
        SideLines::extract(src, None, ignore, filter.as_ref(), &Interrupt::never()).unwrap()
    }

    fn hashes(side: &SideLines<'_>) -> Vec<u64> {
        side.lines().iter().map(|l| l.hash).collect()
    }

    #[test]
    fn test_strict_hashes_include_eol() {
        let src = MemorySource::new("a\na\r\na");
        let side = extract(&src, &IgnoreOptions::default());
        let h = hashes(&side);
        assert_ne!(h[0], h[1]);
        assert_ne!(h[0], h[2]);

        let ignore = IgnoreOptions { eol: true, ..IgnoreOptions::default() };
        let side = extract(&src, &ignore);
        let h = hashes(&side);
        assert_eq!(h[0], h[1]);
        assert_eq!(h[1], h[2]);
    }

    #[test]
    fn test_space_rules() {
        let src = MemorySource::new("a  b\na\tb\nab\n");
        let changed = IgnoreOptions { changed_spaces: true, ..IgnoreOptions::default() };
        let h = hashes(&extract(&src, &changed));
        assert_eq!(h[0], h[1]);
        assert_ne!(h[1], h[2]);

        let all = IgnoreOptions { all_spaces: true, ..IgnoreOptions::default() };
        let h = hashes(&extract(&src, &all));
        assert_eq!(h[0], h[1]);
        assert_eq!(h[1], h[2]);
    }

    #[test]
    fn test_case_rule() {
        let src = MemorySource::new("Hello\nhELLO\n");
        let ignore = IgnoreOptions { case: true, ..IgnoreOptions::default() };
        let h = hashes(&extract(&src, &ignore));
        assert_eq!(h[0], h[1]);
    }

    #[test]
    fn test_skipped_lines_keep_doc_numbers() {
        let src = MemorySource::new("a\n\nb\n  \nc\n")
            .with_visibility(4, Visibility::Folded);
        let ignore = IgnoreOptions {
            empty_lines: true,
            all_spaces: true,
            folded_lines: true,
            ..IgnoreOptions::default()
        };
        let side = extract(&src, &ignore);
        let docs: Vec<usize> = (0..side.len()).map(|i| side.doc_line(i)).collect();
        assert_eq!(docs, vec![0, 2]);
        assert_eq!(side.cursor_doc(2), 5);
    }

    #[test]
    fn test_blank_flag() {
        let src = MemorySource::new("\n  \nx\n");
        let side = extract(&src, &IgnoreOptions::default());
        let blank: Vec<bool> = side.lines().iter().map(|l| l.blank).collect();
        assert_eq!(blank, vec![true, false, false]);
    }

    #[test]
    fn test_regex_spans_and_dropped_lines() {
        let src = MemorySource::new("2024-01-01 x\n2025-12-31 x\nno date\n");
        let ignore = IgnoreOptions {
            regex: Some(RegexIgnore::new(r"^\d{4}-\d{2}-\d{2}\s+").dropping_nomatch_lines()),
            ..IgnoreOptions::default()
        };
        let side = extract(&src, &ignore);
        assert_eq!(side.len(), 2);
        assert_eq!(side.lines()[0].hash, side.lines()[1].hash);
        assert_eq!(side.ignored_spans(0), &[Range::new(0, 11)]);
        assert_eq!(side.lines_with_ignores(), vec![0, 1]);
    }

    #[test]
    fn test_selection_limits_lines() {
        let src = MemorySource::new("a\nb\nc\nd\n");
        let side = SideLines::extract(
            &src,
            Some(LineSpan::new(1, 3)),
            &IgnoreOptions::default(),
            None,
            &Interrupt::never(),
        )
        .unwrap();
        assert_eq!(side.len(), 2);
        assert_eq!(side.doc_line(0), 1);
        assert_eq!(side.cursor_doc(2), 3);
    }

    #[test]
    fn test_extract_cancels() {
        let text = "x\n".repeat(2_500);
        let src = MemorySource::new(text);
        let cancel = || true;
        let result = SideLines::extract(
            &src,
            None,
            &IgnoreOptions::default(),
            None,
            &Interrupt::new(&cancel),
        );
        assert!(result.is_err_and(|e| e.is_cancelled()));
    }

    #[test]
    fn test_words() {
        let src = MemorySource::new("int foo = 1+2;\n");
        let side = extract(&src, &IgnoreOptions::default());
        let mut words = Vec::new();
        side.words(0, &mut words);
        let spans: Vec<(u32, u32)> = words.iter().map(|w| (w.byte_off, w.byte_end())).collect();
        assert_eq!(
            spans,
            vec![(0, 3), (3, 4), (4, 7), (7, 8), (8, 9), (9, 10), (10, 11), (11, 12), (12, 13), (13, 14), (14, 15)]
        );
    }

    #[test]
    fn test_words_drop_spaces_and_eol_when_ignored() {
        let src = MemorySource::new("a  b\n");
        let ignore = IgnoreOptions { all_spaces: true, eol: true, ..IgnoreOptions::default() };
        let side = extract(&src, &ignore);
        let mut words = Vec::new();
        side.words(0, &mut words);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].byte_off, 3);
    }

    #[test]
    fn test_chars_collapse_space_runs() {
        let src = MemorySource::new("a \t b");
        let ignore = IgnoreOptions { changed_spaces: true, ..IgnoreOptions::default() };
        let side = extract(&src, &ignore);
        let mut chars = Vec::new();
        side.chars(0, 0, usize::MAX, &mut chars);
        assert_eq!(chars.len(), 3);
        assert_eq!((chars[1].byte_pos, chars[1].byte_end()), (1, 4));
        assert_eq!(chars[1].hash, u32::from(' '));
    }

    #[test]
    fn test_chars_skip_ignored_spans() {
        let src = MemorySource::new("ab12cd");
        let ignore = IgnoreOptions {
            regex: Some(RegexIgnore::new(r"\d+")),
            ..IgnoreOptions::default()
        };
        let side = extract(&src, &ignore);
        let mut chars = Vec::new();
        side.chars(0, 0, usize::MAX, &mut chars);
        let positions: Vec<u32> = chars.iter().map(|c| c.byte_pos).collect();
        assert_eq!(positions, vec![0, 1, 4, 5]);
    }
}
