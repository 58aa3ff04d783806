//! Move ordering and the static evaluation used at the depth horizon.

use crate::board::{Board, Move};
use crate::constants::{KILLERS_PER_PLY, MAX_PLY, POINT};
use crate::grid::{Color, GroupKind};
use crate::scoring::Analysis;

/// Moves that caused a cutoff, remembered per ply.
#[derive(Debug, Clone)]
pub struct Killers {
    slots: [[Option<Move>; KILLERS_PER_PLY]; MAX_PLY],
}

impl Default for Killers {
    fn default() -> Self {
        Self {
            slots: [[None; KILLERS_PER_PLY]; MAX_PLY],
        }
    }
}

impl Killers {
    pub fn record(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] != Some(mv) {
            slot.rotate_right(1);
            slot[0] = Some(mv);
        }
    }

    /// Rank of a killer move at this ply (0 = most recent).
    pub fn rank(&self, ply: usize, mv: Move) -> Option<usize> {
        self.slots
            .get(ply)?
            .iter()
            .position(|&k| k == Some(mv))
    }
}

/// Per-colour success counts of moves, independent of position.
#[derive(Debug, Clone)]
pub struct History {
    scores: [Vec<u32>; 2],
}

impl History {
    /// Table for a board of `points` intersections; the extra slot is the pass.
    pub fn new(points: usize) -> Self {
        Self {
            scores: [vec![0; points + 1], vec![0; points + 1]],
        }
    }

    fn slot(&self, mv: Move, cols: usize) -> usize {
        match mv {
            Move::Place(p) => p.row * cols + p.col,
            Move::Pass => self.scores[0].len() - 1,
        }
    }

    pub fn record(&mut self, color: Color, mv: Move, cols: usize, depth: u8) {
        let slot = self.slot(mv, cols);
        let bonus = u32::from(depth) * u32::from(depth);
        if let Some(score) = self.scores[color.index()].get_mut(slot) {
            *score = score.saturating_add(bonus);
        }
    }

    pub fn score(&self, color: Color, mv: Move, cols: usize) -> u32 {
        self.scores[color.index()]
            .get(self.slot(mv, cols))
            .copied()
            .unwrap_or(0)
    }
}

/// A legal move with the board it leads to.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mv: Move,
    pub board: Board,
    pub captured: u32,
}

/// Sort candidates: the table move, then killers, then captures, then by
/// history. Passing comes last unless it is the table move.
pub fn order(
    candidates: &mut [Candidate],
    color: Color,
    ply: usize,
    tt_move: Option<Move>,
    killers: &Killers,
    history: &History,
) {
    candidates.sort_by_cached_key(|c| {
        let cols = c.board.cols();
        let priority: i64 = if Some(c.mv) == tt_move {
            i64::MAX
        } else if c.mv == Move::Pass {
            i64::MIN
        } else if let Some(rank) = killers.rank(ply, c.mv) {
            (1 << 50) - rank as i64
        } else {
            (i64::from(c.captured) << 32) + i64::from(history.score(color, c.mv, cols))
        };
        std::cmp::Reverse(priority)
    });
}

/// Positional adjustment from Black's side, always smaller in magnitude than
/// half a point so it only breaks ties between equal scores.
///
/// Rewards unconditionally alive stones and liberties of chains that are not
/// yet settled.
pub fn heuristic(board: &Board, analysis: &Analysis) -> i32 {
    let grid = board.grid();
    let mut raw = 0i32;
    for color in Color::ALL {
        let sign = color.sign();
        raw += sign * analysis.unconditionally_alive(color).len() as i32;
        for (_, group) in grid.groups() {
            if group.kind != GroupKind::Stones(color) {
                continue;
            }
            let settled = group
                .anchor()
                .is_some_and(|a| analysis.alive(color).contains(&a));
            if !settled {
                raw += sign * group.liberties.len().min(4) as i32;
            }
        }
    }
    let cap = POINT / 2 - 1;
    raw.clamp(-cap, cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{grid_from_rows, Point};

    fn place(row: usize, col: usize) -> Move {
        Move::Place(Point::new(row, col))
    }

    #[test]
    fn test_killers_keep_most_recent_first() {
        let mut killers = Killers::default();
        killers.record(3, place(0, 0));
        killers.record(3, place(1, 1));
        killers.record(3, place(1, 1));
        assert_eq!(killers.rank(3, place(1, 1)), Some(0));
        assert_eq!(killers.rank(3, place(0, 0)), Some(1));
        killers.record(3, place(2, 2));
        assert_eq!(killers.rank(3, place(0, 0)), None);
        assert_eq!(killers.rank(4, place(2, 2)), None);
        // Out-of-range plies are ignored.
        killers.record(MAX_PLY + 5, Move::Pass);
    }

    #[test]
    fn test_history_accumulates_depth_squared() {
        let mut history = History::new(9);
        history.record(Color::Black, place(1, 2), 3, 3);
        history.record(Color::Black, place(1, 2), 3, 2);
        history.record(Color::White, Move::Pass, 3, 4);
        assert_eq!(history.score(Color::Black, place(1, 2), 3), 13);
        assert_eq!(history.score(Color::White, place(1, 2), 3), 0);
        assert_eq!(history.score(Color::White, Move::Pass, 3), 16);
    }

    #[test]
    fn test_order_puts_pass_last() {
        let board = Board::new(2, 2).unwrap();
        let mut candidates: Vec<Candidate> = [place(0, 0), Move::Pass, place(1, 1)]
            .into_iter()
            .map(|mv| Candidate {
                mv,
                board: board.apply(Color::Black, mv, false).unwrap(),
                captured: 0,
            })
            .collect();
        let mut history = History::new(4);
        history.record(Color::Black, place(1, 1), 2, 2);
        let killers = Killers::default();
        order(&mut candidates, Color::Black, 0, None, &killers, &history);
        let moves: Vec<Move> = candidates.iter().map(|c| c.mv).collect();
        assert_eq!(moves, vec![place(1, 1), place(0, 0), Move::Pass]);
        order(&mut candidates, Color::Black, 0, Some(Move::Pass), &killers, &history);
        assert_eq!(candidates[0].mv, Move::Pass);
    }

    #[test]
    fn test_heuristic_stays_below_half_point() {
        let board = Board::from_grid(grid_from_rows(&[
            ". X . X O . O .",
            "X X X X O O O O",
            ". . . . . . . .",
        ]));
        let value = heuristic(&board, board.analysis());
        assert!(value.abs() < POINT / 2);
        let crowded = Board::from_grid(grid_from_rows(&[
            "X . X . X . X . X",
            ". . . . . . . . .",
            "X . X . X . X . X",
        ]));
        assert_eq!(heuristic(&crowded, crowded.analysis()), POINT / 2 - 1);
    }
}
