//! Diff algorithms over hashed element sequences.
//!
//! - `myers`: linear-space recursive Myers (used for word and char passes)
//! - `fast_myers`: iterative ring-buffer Myers (default line differ)
//! - `histogram`: rarest-anchor splitting for heavily duplicated input
//! - `script`: edit scripts and chunks
//! - `shift`: boundary shift applied after every strategy

mod fast_myers;
mod histogram;
mod myers;
mod script;
mod shift;

pub use crate::options::Algorithm;
pub use script::{Chunk, EditOp, OpTag, from_chunks, to_chunks};
pub use shift::shift_boundaries;

pub(crate) use script::ScriptBuilder;

use crate::element::DiffElement;
use crate::error::CompareResult;
use crate::interrupt::Interrupt;

/// Diff `a` against `b` with `algorithm` and return the canonical,
/// boundary-shifted edit script.
///
/// `histogram_max` caps the combined occurrence count of a histogram anchor
/// and is ignored by the other strategies.
pub fn diff<E: DiffElement>(
    algorithm: Algorithm,
    a: &[E],
    b: &[E],
    histogram_max: u32,
    interrupt: &Interrupt<'_>,
) -> CompareResult<Vec<EditOp>> {
    Ok(from_chunks(&diff_chunks(algorithm, a, b, histogram_max, interrupt)?))
}

/// Same as [`diff`], returned in chunked form.
pub(crate) fn diff_chunks<E: DiffElement>(
    algorithm: Algorithm,
    a: &[E],
    b: &[E],
    histogram_max: u32,
    interrupt: &Interrupt<'_>,
) -> CompareResult<Vec<Chunk>> {
    let mut out = ScriptBuilder::new();
    match algorithm {
        Algorithm::Myers => myers::diff_into(a, b, &mut out, interrupt)?,
        Algorithm::FastMyers => fast_myers::diff_into(a, b, &mut out, interrupt)?,
        Algorithm::Histogram => histogram::diff_into(a, b, histogram_max, &mut out, interrupt)?,
    }
    let mut chunks = to_chunks(&out.finish());
    shift_boundaries(a, b, &mut chunks);
    Ok(chunks)
}
