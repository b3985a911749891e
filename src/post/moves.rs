//! Block move detection.
//!
//! Anchors are non-blank lines whose hash occurs exactly once among all
//! deleted lines and exactly once among all inserted lines. Each anchor grows
//! in both directions while the lines stay equal, stay inside their blocks
//! and are not yet part of another move.

use rustc_hash::FxHashMap;

use crate::element::LineElem;
use crate::model::{DiffBlock, MoveRange, Range};

#[derive(Debug, Clone, Copy, Default)]
struct Candidate {
    count_a: u32,
    count_b: u32,
    b_pos: usize,
    b_block: usize,
}

/// Fill `moved_a`/`moved_b` of every block. Returns the number of moved lines
/// per side.
pub(crate) fn detect_moves(blocks: &mut [DiffBlock], a: &[LineElem], b: &[LineElem]) -> usize {
    let mut table: FxHashMap<u64, Candidate> = FxHashMap::default();
    for (bi, block) in blocks.iter().enumerate() {
        for line in &a[block.a.s..block.a.e] {
            if !line.blank {
                table.entry(line.hash).or_default().count_a += 1;
            }
        }
        for j in block.b.s..block.b.e {
            if !b[j].blank {
                let c = table.entry(b[j].hash).or_default();
                c.count_b += 1;
                c.b_pos = j;
                c.b_block = bi;
            }
        }
    }

    // Anchors in block order, then by offset
    let mut anchors = Vec::new();
    for (bi, block) in blocks.iter().enumerate() {
        for i in block.a.s..block.a.e {
            if let Some(c) = table.get(&a[i].hash) {
                if c.count_a == 1 && c.count_b == 1 && !a[i].blank {
                    anchors.push((i, bi, c.b_pos, c.b_block));
                }
            }
        }
    }

    let mut moved_a = vec![false; a.len()];
    let mut moved_b = vec![false; b.len()];
    let mut total = 0;
    for (i, ba, j, bb) in anchors {
        if moved_a[i] || moved_b[j] {
            continue;
        }
        let (ra, rb) = (blocks[ba].a, blocks[bb].b);
        let free = |x: usize, y: usize| a[x].hash == b[y].hash && !moved_a[x] && !moved_b[y];

        let mut back = 0;
        while i - back > ra.s && j - back > rb.s && free(i - back - 1, j - back - 1) {
            back += 1;
        }
        let mut fwd = 1;
        while i + fwd < ra.e && j + fwd < rb.e && free(i + fwd, j + fwd) {
            fwd += 1;
        }

        let (sa, sb, len) = (i - back, j - back, back + fwd);
        moved_a[sa..sa + len].fill(true);
        moved_b[sb..sb + len].fill(true);
        blocks[ba].moved_a.push(MoveRange {
            range: Range::new(sa, sa + len),
            peer_block: bb,
            peer_start: sb,
        });
        blocks[bb].moved_b.push(MoveRange {
            range: Range::new(sb, sb + len),
            peer_block: ba,
            peer_start: sa,
        });
        total += len;
    }

    for block in blocks.iter_mut() {
        block.moved_a.sort_unstable_by_key(|m| m.range.s);
        block.moved_b.sort_unstable_by_key(|m| m.range.s);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(hashes: &[u64]) -> Vec<LineElem> {
        hashes
            .iter()
            .enumerate()
            .map(|(i, &hash)| LineElem { doc_line: i as u32, hash, blank: hash == 0 })
            .collect()
    }

    #[test]
    fn test_moved_block_between_pure_blocks() {
        // A: a b c d   B: c d a b   (a b deleted up top, inserted at the end)
        let a = lines(&[1, 2, 3, 4]);
        let b = lines(&[3, 4, 1, 2]);
        let mut blocks = vec![
            DiffBlock::new(Range::new(0, 2), Range::new(0, 0)),
            DiffBlock::new(Range::new(4, 4), Range::new(2, 4)),
        ];
        let total = detect_moves(&mut blocks, &a, &b);
        assert_eq!(total, 2);
        assert_eq!(blocks[0].moved_a, vec![MoveRange { range: Range::new(0, 2), peer_block: 1, peer_start: 2 }]);
        assert_eq!(blocks[1].moved_b, vec![MoveRange { range: Range::new(2, 4), peer_block: 0, peer_start: 0 }]);
    }

    #[test]
    fn test_duplicates_and_blanks_are_not_anchors() {
        let a = lines(&[5, 5, 0]);
        let b = lines(&[5, 5, 0]);
        let mut blocks = vec![DiffBlock::new(Range::new(0, 3), Range::new(0, 3))];
        assert_eq!(detect_moves(&mut blocks, &a, &b), 0);
        assert!(blocks[0].moved_a.is_empty());
    }

    #[test]
    fn test_extension_crosses_blank_lines_but_not_blocks() {
        let a = lines(&[7, 0, 8, 9]);
        let b = lines(&[9, 7, 0, 8]);
        let mut blocks = vec![
            DiffBlock::new(Range::new(0, 3), Range::new(0, 1)),
            DiffBlock::new(Range::new(4, 4), Range::new(1, 4)),
        ];
        // 9 is inserted but never deleted, so only 7 / blank / 8 moves
        let total = detect_moves(&mut blocks, &a, &b);
        assert_eq!(total, 3);
        assert_eq!(blocks[1].moved_b[0].range, Range::new(1, 4));
    }

    #[test]
    fn test_moves_are_symmetric() {
        let a = lines(&[1, 2, 3, 10, 11, 4, 5]);
        let b = lines(&[4, 5, 20, 1, 2, 3, 21]);
        let mut blocks = vec![
            DiffBlock::new(Range::new(0, 5), Range::new(0, 3)),
            DiffBlock::new(Range::new(5, 7), Range::new(3, 7)),
        ];
        assert_eq!(detect_moves(&mut blocks, &a, &b), 5);
        for block in &blocks {
            for m in &block.moved_a {
                let peer = &blocks[m.peer_block];
                let mirror = peer.moved_b.iter().find(|p| p.range.s == m.peer_start).unwrap();
                assert_eq!(mirror.range.len(), m.range.len());
                for k in 0..m.range.len() {
                    assert_eq!(a[m.range.s + k].hash, b[mirror.range.s + k].hash);
                }
            }
        }
    }
}
