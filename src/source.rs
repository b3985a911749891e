//! Text collaborators supplied by the host.
//!
//! The engine never owns document text. It reads lines through [`TextSource`],
//! one source per side, and expects the bytes to stay put for the whole call.

use rustc_hash::FxHashMap;

/// How the host currently displays a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Shown normally
    #[default]
    Visible,
    /// Inside a collapsed fold
    Folded,
    /// Hidden by the host
    Hidden,
}

/// Read-only access to one side's UTF-8 text.
///
/// Must be `Sync`: refinement workers read both sides concurrently.
pub trait TextSource: Sync {
    /// Number of document lines.
    fn line_count(&self) -> usize;

    /// Bytes of lines `from_line..to_line`, including their terminators.
    fn text(&self, from_line: usize, to_line: usize) -> &[u8];

    /// Bytes of a single line including its terminator.
    fn line(&self, line: usize) -> &[u8] {
        self.text(line, line + 1)
    }

    /// Display state of a line.
    fn visibility(&self, _line: usize) -> Visibility {
        Visibility::Visible
    }
}

// =============================================================================
// MemorySource
// =============================================================================

/// In-memory text split on `\n`; each line keeps its terminator.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bytes: Vec<u8>,
    /// Start offset of every line, plus one trailing entry at `bytes.len()`
    starts: Vec<usize>,
    visibility: FxHashMap<usize, Visibility>,
}

impl MemorySource {
    /// Wrap a buffer.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let mut starts = vec![0];
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        // Text after the last newline forms a final unterminated line
        if starts.last() != Some(&bytes.len()) {
            starts.push(bytes.len());
        }
        Self {
            bytes,
            starts,
            visibility: FxHashMap::default(),
        }
    }

    /// Build from individual lines, each of which should carry its terminator.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
        }
        Self::new(text)
    }

    /// Override the visibility of one line.
    pub fn with_visibility(mut self, line: usize, visibility: Visibility) -> Self {
        self.set_visibility(line, visibility);
        self
    }

    /// Override the visibility of one line in place.
    pub fn set_visibility(&mut self, line: usize, visibility: Visibility) {
        if visibility == Visibility::Visible {
            self.visibility.remove(&line);
        } else {
            self.visibility.insert(line, visibility);
        }
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl TextSource for MemorySource {
    fn line_count(&self) -> usize {
        self.starts.len() - 1
    }

    fn text(&self, from_line: usize, to_line: usize) -> &[u8] {
        let count = self.line_count();
        let from = from_line.min(count);
        let to = to_line.clamp(from, count);
        &self.bytes[self.starts[from]..self.starts[to]]
    }

    fn visibility(&self, line: usize) -> Visibility {
        self.visibility.get(&line).copied().unwrap_or_default()
    }
}

/// Split a raw line into content and terminator (`\n`, `\r\n` or a lone `\r`).
pub fn split_eol(line: &[u8]) -> (&[u8], &[u8]) {
    let content_len = match line {
        [.., b'\r', b'\n'] => line.len() - 2,
        [.., b'\n'] | [.., b'\r'] => line.len() - 1,
        _ => line.len(),
    };
    line.split_at(content_len)
}
