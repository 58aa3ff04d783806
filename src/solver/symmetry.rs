//! The eight symmetries of a square board and canonicalization under them.
//!
//! Rectangular boards only admit the four symmetries that keep their shape.
//! A position's canonical form is the image with the smallest Zobrist key;
//! every symmetric variant of a position therefore shares one table entry.

use crate::board::{Board, Move};
use crate::grid::{Color, Point};

use super::zobrist::Zobrist;

/// An element of the dihedral group of the square.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    /// Quarter turn clockwise.
    Rotate90,
    Rotate180,
    Rotate270,
    /// Mirror top to bottom.
    FlipRows,
    /// Mirror left to right.
    FlipCols,
    /// Mirror along the main diagonal.
    Transpose,
    /// Mirror along the anti-diagonal.
    AntiTranspose,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::FlipRows,
        Symmetry::FlipCols,
        Symmetry::Transpose,
        Symmetry::AntiTranspose,
    ];

    /// Whether the symmetry maps a `rows`×`cols` board onto itself.
    pub fn preserves_shape(self, rows: usize, cols: usize) -> bool {
        rows == cols
            || matches!(
                self,
                Symmetry::Identity | Symmetry::Rotate180 | Symmetry::FlipRows | Symmetry::FlipCols
            )
    }

    /// The symmetries of a board of the given shape.
    pub fn of_board(rows: usize, cols: usize) -> Vec<Symmetry> {
        Self::ALL
            .into_iter()
            .filter(|s| s.preserves_shape(rows, cols))
            .collect()
    }

    pub fn inverse(self) -> Symmetry {
        match self {
            Symmetry::Rotate90 => Symmetry::Rotate270,
            Symmetry::Rotate270 => Symmetry::Rotate90,
            other => other,
        }
    }

    /// Image of a point. Only meaningful when the symmetry preserves the
    /// board's shape.
    pub fn apply(self, p: Point, rows: usize, cols: usize) -> Point {
        let (r, c) = (p.row, p.col);
        let (last_row, last_col) = (rows - 1, cols - 1);
        match self {
            Symmetry::Identity => Point::new(r, c),
            Symmetry::Rotate90 => Point::new(c, last_row - r),
            Symmetry::Rotate180 => Point::new(last_row - r, last_col - c),
            Symmetry::Rotate270 => Point::new(last_col - c, r),
            Symmetry::FlipRows => Point::new(last_row - r, c),
            Symmetry::FlipCols => Point::new(r, last_col - c),
            Symmetry::Transpose => Point::new(c, r),
            Symmetry::AntiTranspose => Point::new(last_col - c, last_row - r),
        }
    }

    #[inline]
    pub fn map_index(self, idx: usize, rows: usize, cols: usize) -> usize {
        let p = self.apply(Point::new(idx / cols, idx % cols), rows, cols);
        p.row * cols + p.col
    }

    pub fn map_move(self, mv: Move, rows: usize, cols: usize) -> Move {
        match mv {
            Move::Place(p) => Move::Place(self.apply(p, rows, cols)),
            Move::Pass => Move::Pass,
        }
    }
}

/// Canonical key of a position and the symmetry that produces it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Canonical {
    pub key: u64,
    pub symmetry: Symmetry,
}

/// Pick the image of the position with the smallest key among `symmetries`.
pub fn canonicalize(zobrist: &Zobrist, board: &Board, to_move: Color, symmetries: &[Symmetry]) -> Canonical {
    symmetries
        .iter()
        .map(|&symmetry| Canonical {
            key: zobrist.position(board, to_move, symmetry),
            symmetry,
        })
        .min_by_key(|c| c.key)
        .unwrap_or(Canonical {
            key: zobrist.position(board, to_move, Symmetry::Identity),
            symmetry: Symmetry::Identity,
        })
}
