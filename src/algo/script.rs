//! Edit scripts and their chunked view.

/// Kind of an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    /// Elements equal on both sides
    Match,
    /// Elements only in A (deleted)
    In1,
    /// Elements only in B (inserted)
    In2,
}

/// One run of an edit script.
///
/// `off` indexes side A for `Match` and `In1`, side B for `In2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditOp {
    pub tag: OpTag,
    pub off: usize,
    pub len: usize,
}

impl EditOp {
    /// Elements this op consumes from A.
    #[inline]
    pub fn a_len(&self) -> usize {
        match self.tag {
            OpTag::Match | OpTag::In1 => self.len,
            OpTag::In2 => 0,
        }
    }

    /// Elements this op consumes from B.
    #[inline]
    pub fn b_len(&self) -> usize {
        match self.tag {
            OpTag::Match | OpTag::In2 => self.len,
            OpTag::In1 => 0,
        }
    }
}

// =============================================================================
// ScriptBuilder
// =============================================================================

/// Accumulates edits in order and emits a canonical script.
///
/// Canonical form: the first op is a `Match` (zero-length only in that
/// position), adjacent ops of one tag are merged, and inside a block `In1`
/// precedes `In2`.
#[derive(Debug, Default)]
pub(crate) struct ScriptBuilder {
    ops: Vec<EditOp>,
    a: usize,
    b: usize,
    pending_del: usize,
    pending_ins: usize,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.flush();
        match self.ops.last_mut() {
            Some(op) if op.tag == OpTag::Match => op.len += len,
            _ => self.ops.push(EditOp {
                tag: OpTag::Match,
                off: self.a,
                len,
            }),
        }
        self.a += len;
        self.b += len;
    }

    pub fn delete(&mut self, len: usize) {
        self.pending_del += len;
    }

    pub fn insert(&mut self, len: usize) {
        self.pending_ins += len;
    }

    fn flush(&mut self) {
        if self.pending_del > 0 {
            self.ops.push(EditOp {
                tag: OpTag::In1,
                off: self.a,
                len: self.pending_del,
            });
            self.a += self.pending_del;
            self.pending_del = 0;
        }
        if self.pending_ins > 0 {
            self.ops.push(EditOp {
                tag: OpTag::In2,
                off: self.b,
                len: self.pending_ins,
            });
            self.b += self.pending_ins;
            self.pending_ins = 0;
        }
    }

    pub fn finish(mut self) -> Vec<EditOp> {
        self.flush();
        if self.ops.first().is_some_and(|op| op.tag != OpTag::Match) {
            self.ops.insert(
                0,
                EditOp {
                    tag: OpTag::Match,
                    off: 0,
                    len: 0,
                },
            );
        }
        self.ops
    }
}

// =============================================================================
// Chunks
// =============================================================================

/// A `Match` run followed by the block (possibly empty) after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chunk {
    /// Start of the equal run in A
    pub a_off: usize,
    /// Start of the equal run in B
    pub b_off: usize,
    pub equal: usize,
    /// Elements deleted from A after the equal run
    pub del: usize,
    /// Elements inserted from B after the equal run
    pub ins: usize,
}

impl Chunk {
    /// First A index of the block.
    #[inline]
    pub fn del_start(&self) -> usize {
        self.a_off + self.equal
    }

    /// First B index of the block.
    #[inline]
    pub fn ins_start(&self) -> usize {
        self.b_off + self.equal
    }

    #[inline]
    pub fn has_block(&self) -> bool {
        self.del > 0 || self.ins > 0
    }
}

/// Group a script into chunks. Accepts either order inside a block.
pub fn to_chunks(ops: &[EditOp]) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let (mut a, mut b) = (0, 0);
    for op in ops {
        let starts_chunk = match chunks.last() {
            None => true,
            Some(_) => op.tag == OpTag::Match,
        };
        if starts_chunk {
            chunks.push(Chunk {
                a_off: a,
                b_off: b,
                ..Chunk::default()
            });
        }
        if let Some(chunk) = chunks.last_mut() {
            match op.tag {
                OpTag::Match => chunk.equal += op.len,
                OpTag::In1 => chunk.del += op.len,
                OpTag::In2 => chunk.ins += op.len,
            }
        }
        a += op.a_len();
        b += op.b_len();
    }
    chunks
}

/// Rebuild a canonical script from chunks.
pub fn from_chunks(chunks: &[Chunk]) -> Vec<EditOp> {
    let mut builder = ScriptBuilder::new();
    for chunk in chunks {
        builder.equal(chunk.equal);
        builder.delete(chunk.del);
        builder.insert(chunk.ins);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(tag: OpTag, off: usize, len: usize) -> EditOp {
        EditOp { tag, off, len }
    }

    #[test]
    fn test_builder_merges_and_orders() {
        let mut b = ScriptBuilder::new();
        b.equal(2);
        b.equal(1);
        b.insert(1);
        b.delete(2);
        b.equal(1);
        let ops = b.finish();
        assert_eq!(
            ops,
            vec![
                op(OpTag::Match, 0, 3),
                op(OpTag::In1, 3, 2),
                op(OpTag::In2, 3, 1),
                op(OpTag::Match, 5, 1),
            ]
        );
    }

    #[test]
    fn test_builder_leading_block_gets_empty_match() {
        let mut b = ScriptBuilder::new();
        b.delete(1);
        let ops = b.finish();
        assert_eq!(ops, vec![op(OpTag::Match, 0, 0), op(OpTag::In1, 0, 1)]);
    }

    #[test]
    fn test_builder_empty() {
        assert!(ScriptBuilder::new().finish().is_empty());
    }

    #[test]
    fn test_chunks_accept_either_order() {
        let ops = vec![
            op(OpTag::Match, 0, 1),
            op(OpTag::In2, 1, 2),
            op(OpTag::In1, 1, 1),
            op(OpTag::Match, 2, 3),
        ];
        let chunks = to_chunks(&ops);
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].equal, chunks[0].del, chunks[0].ins), (1, 1, 2));
        assert_eq!((chunks[1].a_off, chunks[1].b_off, chunks[1].equal), (2, 3, 3));
        assert!(!chunks[1].has_block());

        let canonical = from_chunks(&chunks);
        assert_eq!(canonical[1], op(OpTag::In1, 1, 1));
        assert_eq!(canonical[2], op(OpTag::In2, 1, 2));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(op(OpTag::In1, 0, 4).a_len(), 4);
        assert_eq!(op(OpTag::In1, 0, 4).b_len(), 0);
        assert_eq!(op(OpTag::Match, 0, 4).b_len(), 4);
    }
}
