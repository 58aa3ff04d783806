//! Zobrist keys for search positions.
//!
//! Keys are drawn from a fixed-seed generator so the same position always
//! hashes the same way. A position hash covers the stones, the side to move,
//! the ko point, the pass count and the prisoner balance; the layout hash
//! covers the stones only and is what long-cycle detection compares.

use crate::board::Board;
use crate::constants::ZOBRIST_SEED;
use crate::grid::{Color, Grid};

use super::symmetry::Symmetry;

/// Random keys for every (point, colour) pair plus the non-stone state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zobrist {
    stones: [Vec<u64>; 2],
    ko: Vec<u64>,
    passes: [u64; 3],
    prisoners: Vec<u64>,
    black_to_move: u64,
}

impl Zobrist {
    pub fn new(points: usize) -> Self {
        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
        let mut keys = |n: usize| -> Vec<u64> { (0..n).map(|_| rng.u64(..)).collect() };
        let stones = [keys(points), keys(points)];
        let ko = keys(points);
        // Prisoner balances are folded into a ring twice the board size;
        // signatures disambiguate the rare wrap-around.
        let prisoners = keys(2 * points + 1);
        let rest = keys(4);
        Self {
            stones,
            ko,
            passes: [rest[0], rest[1], rest[2]],
            prisoners,
            black_to_move: rest[3],
        }
    }

    /// Hash of the stone layout alone, in the board's own orientation.
    pub fn layout(&self, grid: &Grid) -> u64 {
        grid.iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.stone.map(|c| self.stones[c.index()][idx]))
            .fold(0, |h, key| h ^ key)
    }

    /// Hash of a search position seen through `symmetry`.
    pub fn position(&self, board: &Board, to_move: Color, symmetry: Symmetry) -> u64 {
        let (rows, cols) = (board.rows(), board.cols());
        let map = |idx: usize| symmetry.map_index(idx, rows, cols);
        let mut h = 0;
        for (idx, cell) in board.grid().iter().enumerate() {
            if let Some(color) = cell.stone {
                h ^= self.stones[color.index()][map(idx)];
            }
        }
        if let Some(ko) = board.ko_index() {
            h ^= self.ko[map(ko)];
        }
        h ^= self.passes[usize::from(board.passes()).min(2)];
        let balance = i64::from(board.prisoners(Color::Black)) - i64::from(board.prisoners(Color::White));
        h ^= self.prisoners[balance.rem_euclid(self.prisoners.len() as i64) as usize];
        if to_move == Color::Black {
            h ^= self.black_to_move;
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;

    #[test]
    fn test_keys_are_reproducible() {
        assert_eq!(Zobrist::new(25), Zobrist::new(25));
    }

    #[test]
    fn test_layout_ignores_everything_but_stones() {
        let zobrist = Zobrist::new(9);
        let board = Board::new(3, 3).unwrap();
        let played = board.play(Color::Black, Point::new(1, 1), false).unwrap();
        assert_eq!(zobrist.layout(board.grid()), 0);
        assert_ne!(zobrist.layout(played.grid()), 0);
        assert_eq!(zobrist.layout(played.grid()), zobrist.layout(played.pass().grid()));
    }

    #[test]
    fn test_position_distinguishes_state() {
        let zobrist = Zobrist::new(9);
        let board = Board::new(3, 3)
            .unwrap()
            .play(Color::Black, Point::new(0, 0), false)
            .unwrap();
        let id = Symmetry::Identity;
        let base = zobrist.position(&board, Color::White, id);
        assert_ne!(base, zobrist.position(&board, Color::Black, id));
        assert_ne!(base, zobrist.position(&board.pass(), Color::White, id));
        assert_ne!(base, zobrist.position(&board.clone().with_prisoners([1, 0]), Color::White, id));
    }
}
