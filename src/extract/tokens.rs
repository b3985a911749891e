//! Character decoding, classification and folding.

use crate::hash::StableHasher;
use crate::options::IgnoreOptions;

// =============================================================================
// Decoding
// =============================================================================

/// Iterates `(byte_pos, byte_len, char)` over possibly invalid UTF-8.
///
/// Each byte that does not start a valid sequence yields one U+FFFD of length 1.
pub(crate) struct Scalars<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Scalars<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::range(bytes, 0, bytes.len())
    }

    /// Decode `bytes[start..end]`, reporting positions relative to `bytes`.
    pub fn range(bytes: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(bytes.len());
        Self {
            bytes,
            pos: start.min(end),
            end,
        }
    }
}

impl Iterator for Scalars<'_> {
    type Item = (usize, usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }
        let pos = self.pos;
        let (c, len) = decode_at(&self.bytes[..self.end], pos);
        self.pos += len;
        Some((pos, len, c))
    }
}

fn sequence_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn decode_at(bytes: &[u8], pos: usize) -> (char, usize) {
    let lead = bytes[pos];
    let width = sequence_width(lead);
    if width == 1 {
        return (char::from(lead), 1);
    }
    if width == 0 || pos + width > bytes.len() {
        return (char::REPLACEMENT_CHARACTER, 1);
    }
    match std::str::from_utf8(&bytes[pos..pos + width]) {
        Ok(s) => s
            .chars()
            .next()
            .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, width)),
        Err(_) => (char::REPLACEMENT_CHARACTER, 1),
    }
}

// =============================================================================
// Classes
// =============================================================================

/// Word-splitting class of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// U+0020 and U+0009
    Space,
    /// Unicode letters and digits, plus `_`
    AlphaNum,
    Other,
}

impl CharClass {
    #[inline]
    pub fn of(c: char) -> Self {
        match c {
            ' ' | '\t' => Self::Space,
            '_' => Self::AlphaNum,
            c if c.is_alphanumeric() => Self::AlphaNum,
            _ => Self::Other,
        }
    }
}

// =============================================================================
// HashRules
// =============================================================================

/// The subset of [`IgnoreOptions`] that changes how text hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct HashRules {
    pub all_spaces: bool,
    pub changed_spaces: bool,
    pub case: bool,
    /// Line terminators take part in hashing
    pub hash_eol: bool,
}

impl HashRules {
    pub fn from_options(ignore: &IgnoreOptions) -> Self {
        Self {
            all_spaces: ignore.all_spaces,
            changed_spaces: ignore.changed_spaces,
            case: ignore.case,
            hash_eol: !ignore.eol,
        }
    }

    /// Fold `c` into `hasher` after case folding.
    #[inline]
    pub fn feed(&self, hasher: &mut StableHasher, c: char) {
        if self.case && !c.is_lowercase() {
            for lower in c.to_lowercase() {
                hasher.write_char(lower);
            }
        } else {
            hasher.write_char(c);
        }
    }

    /// Single folded scalar used for char-level elements.
    #[inline]
    pub fn fold_char(&self, c: char) -> char {
        if self.case {
            c.to_lowercase().next().unwrap_or(c)
        } else {
            c
        }
    }

    /// Hash of a whitespace run under the active rules, or `None` if
    /// whitespace is dropped entirely.
    pub fn space_run_hash(&self, run: &[u8]) -> Option<u64> {
        if self.all_spaces {
            return None;
        }
        if self.changed_spaces {
            return Some(StableHasher::new().update_char(' ').finish());
        }
        let mut hasher = StableHasher::new();
        for &b in run {
            hasher.write_char(char::from(b));
        }
        Some(hasher.finish())
    }
}
