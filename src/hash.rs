//! Deterministic hashing for compared elements.
//!
//! A 64-bit FNV-style mix with a fixed seed, fed one Unicode scalar at a time.
//! The mix only uses shifts and wrapping adds, so the output is the same on
//! every platform regardless of endianness or pointer width.

/// Initial state of every element hash.
pub const HASH_SEED: u64 = 0x8422_2325;

/// Fold one code unit into `hash`.
///
/// Equivalent to `(hash ^ c) * 0x100000001b3` (the 64-bit FNV prime), spelled
/// out as the shift sum.
#[inline]
pub const fn mix(hash: u64, c: u64) -> u64 {
    let h = hash ^ c;
    h.wrapping_add(h << 1)
        .wrapping_add(h << 4)
        .wrapping_add(h << 5)
        .wrapping_add(h << 7)
        .wrapping_add(h << 8)
        .wrapping_add(h << 40)
}

// =============================================================================
// StableHasher - Builder Pattern
// =============================================================================

/// Incremental element hasher.
///
/// Unlike `std::hash::Hasher`, this produces the same output across process
/// restarts and platforms for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableHasher {
    state: u64,
}

impl StableHasher {
    /// Create a new hasher at [`HASH_SEED`]
    #[inline]
    pub const fn new() -> Self {
        Self { state: HASH_SEED }
    }

    /// Fold a single char in place
    #[inline]
    pub fn write_char(&mut self, c: char) {
        self.state = mix(self.state, u64::from(u32::from(c)));
    }

    /// Update with a char
    #[inline]
    pub fn update_char(mut self, c: char) -> Self {
        self.write_char(c);
        self
    }

    /// Update with every char of a string
    #[inline]
    pub fn update_str(mut self, s: &str) -> Self {
        for c in s.chars() {
            self.write_char(c);
        }
        self
    }

    /// Current hash value
    #[inline]
    pub const fn finish(self) -> u64 {
        self.state
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a whole string with no folding applied.
#[inline]
pub fn hash_str(s: &str) -> u64 {
    StableHasher::new().update_str(s).finish()
}
