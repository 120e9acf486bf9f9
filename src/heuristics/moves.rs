//! OPEN / CLOSE / SWAP neighborhood over open-sets.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::solution::OpenSet;

/// The three move families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Open,
    Close,
    Swap,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Open, MoveKind::Close, MoveKind::Swap];
}

/// A concrete modification of an open-set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Open(usize),
    Close(usize),
    Swap { close: usize, open: usize },
}

impl Move {
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::Open(_) => MoveKind::Open,
            Move::Close(_) => MoveKind::Close,
            Move::Swap { .. } => MoveKind::Swap,
        }
    }

    /// Apply to a copy of `current`; the original is left untouched
    pub fn apply(&self, current: &OpenSet) -> OpenSet {
        let mut next = current.clone();
        match *self {
            Move::Open(j) => {
                next.insert(j);
            }
            Move::Close(j) => {
                next.remove(&j);
            }
            Move::Swap { close, open } => {
                next.remove(&close);
                next.insert(open);
            }
        }
        next
    }
}

fn closed_facilities(open: &OpenSet, num_facilities: usize) -> Vec<usize> {
    (0..num_facilities).filter(|j| !open.contains(j)).collect()
}

fn pick_open<R: Rng + ?Sized>(open: &OpenSet, rng: &mut R) -> Option<usize> {
    if open.is_empty() {
        return None;
    }
    open.iter().nth(rng.gen_range(0..open.len())).copied()
}

/// Draws one random move: kind first, then the facilities involved.
#[derive(Debug, Clone)]
pub struct MoveGenerator {
    kinds: Vec<MoveKind>,
}

impl MoveGenerator {
    pub fn new() -> Self {
        MoveGenerator { kinds: MoveKind::ALL.to_vec() }
    }

    /// Restrict the neighborhood to a subset of move kinds
    pub fn with_kinds(kinds: &[MoveKind]) -> Self {
        MoveGenerator { kinds: kinds.to_vec() }
    }

    /// Draw a move applicable to `open`.
    ///
    /// Returns `None` when the drawn kind has nothing to act on: OPEN with
    /// every facility open, CLOSE with at most one facility open, SWAP with
    /// either side empty.
    pub fn propose<R: Rng + ?Sized>(&self, open: &OpenSet, num_facilities: usize, rng: &mut R) -> Option<Move> {
        match *self.kinds.choose(rng)? {
            MoveKind::Open => {
                let closed = closed_facilities(open, num_facilities);
                closed.choose(rng).map(|&j| Move::Open(j))
            }
            MoveKind::Close => {
                if open.len() <= 1 {
                    return None;
                }
                pick_open(open, rng).map(Move::Close)
            }
            MoveKind::Swap => {
                let closed = closed_facilities(open, num_facilities);
                if closed.is_empty() {
                    return None;
                }
                let close = pick_open(open, rng)?;
                let open_j = *closed.choose(rng)?;
                Some(Move::Swap { close, open: open_j })
            }
        }
    }

    /// Every move applicable to `open`, for exhaustive neighborhoods
    pub fn enumerate(&self, open: &OpenSet, num_facilities: usize) -> Vec<Move> {
        let closed = closed_facilities(open, num_facilities);
        let mut moves = Vec::new();
        for kind in &self.kinds {
            match kind {
                MoveKind::Open => moves.extend(closed.iter().map(|&j| Move::Open(j))),
                MoveKind::Close if open.len() > 1 => moves.extend(open.iter().map(|&j| Move::Close(j))),
                MoveKind::Close => {}
                MoveKind::Swap => {
                    for &close in open {
                        moves.extend(closed.iter().map(|&o| Move::Swap { close, open: o }));
                    }
                }
            }
        }
        moves
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn set(items: &[usize]) -> OpenSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_apply_does_not_mutate_source() {
        let open = set(&[0, 2]);
        let next = Move::Swap { close: 0, open: 1 }.apply(&open);
        assert_eq!(open, set(&[0, 2]));
        assert_eq!(next, set(&[1, 2]));
        assert_eq!(Move::Open(1).apply(&open), set(&[0, 1, 2]));
        assert_eq!(Move::Close(2).apply(&open), set(&[0]));
    }

    #[test]
    fn test_propose_respects_preconditions() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let gen = MoveGenerator::new();

        // Everything open: OPEN and SWAP have nothing to open.
        let full = set(&[0, 1, 2]);
        for _ in 0..200 {
            match gen.propose(&full, 3, &mut rng) {
                Some(Move::Close(j)) => assert!(full.contains(&j)),
                Some(other) => panic!("unexpected move {:?}", other),
                None => {}
            }
        }

        // Single facility open: CLOSE is never proposed.
        let single = set(&[1]);
        for _ in 0..200 {
            match gen.propose(&single, 3, &mut rng) {
                Some(Move::Open(j)) => assert!(!single.contains(&j)),
                Some(Move::Swap { close, open }) => {
                    assert_eq!(close, 1);
                    assert_ne!(open, 1);
                }
                Some(Move::Close(_)) => panic!("closed the last open facility"),
                None => {}
            }
        }
    }

    #[test]
    fn test_propose_draws_all_kinds() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let gen = MoveGenerator::new();
        let open = set(&[0, 1]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            if let Some(m) = gen.propose(&open, 4, &mut rng) {
                seen.insert(m.kind());
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_restricted_kinds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let gen = MoveGenerator::with_kinds(&[MoveKind::Open]);
        let open = set(&[0]);
        for _ in 0..50 {
            assert!(matches!(gen.propose(&open, 3, &mut rng), Some(Move::Open(_))));
        }
    }

    #[test]
    fn test_enumerate_counts() {
        let gen = MoveGenerator::new();
        // 2 open, 2 closed: 2 opens + 2 closes + 4 swaps
        assert_eq!(gen.enumerate(&set(&[0, 1]), 4).len(), 8);
        // 1 open, 2 closed: no closes
        assert_eq!(gen.enumerate(&set(&[0]), 3).len(), 4);
    }
}
