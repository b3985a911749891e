//! Boundary shift.
//!
//! Slides every block forward while the element it starts with equals the
//! element right after it, so ambiguous edits land on the last copy of a
//! repeated structure (closing braces, blank lines). When a block reaches the
//! next one, the two merge.

use crate::element::DiffElement;

use super::script::Chunk;

/// Shift all blocks in `chunks` forward in place. Running it twice is a no-op.
pub fn shift_boundaries<E: DiffElement>(a: &[E], b: &[E], chunks: &mut Vec<Chunk>) {
    let mut i = 0;
    while i + 1 < chunks.len() {
        if !chunks[i].has_block() {
            i += 1;
            continue;
        }
        loop {
            let cur = chunks[i];
            let next = chunks[i + 1];
            let (ds, de) = (cur.del_start(), cur.del_start() + cur.del);
            let (is, ie) = (cur.ins_start(), cur.ins_start() + cur.ins);
            let slides = next.equal > 0
                && (cur.del == 0 || a[ds].key() == a[de].key())
                && (cur.ins == 0 || b[is].key() == b[ie].key());
            if !slides {
                break;
            }

            chunks[i].equal += 1;
            chunks[i + 1].a_off += 1;
            chunks[i + 1].b_off += 1;
            chunks[i + 1].equal -= 1;

            if chunks[i + 1].equal == 0 {
                let absorbed = chunks.remove(i + 1);
                chunks[i].del += absorbed.del;
                chunks[i].ins += absorbed.ins;
                if i + 1 >= chunks.len() {
                    break;
                }
            }
        }
        i += 1;
    }
}
