//! One ply of a game: the stone layout plus prisoners, ko point and passes.
//!
//! Boards are immutable snapshots. Every transition ([`Board::play`],
//! [`Board::pass`], [`Board::erase`]) returns a new board and leaves the
//! original untouched, so a rejected move never changes anything.

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::constants::{COLUMN_LETTERS, MAX_LENGTH, MAX_POINTS, PASSES_TO_END};
use crate::error::{ActionError, PlacementError};
use crate::grid::{Color, Grid, Point};
use crate::scoring::{self, Analysis, LifeMode, Score};

/// A move: a stone on a point, or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    Place(Point),
    Pass,
}

/// Board state during the game.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    /// Stones captured by Black and by White, respectively.
    prisoners: [u32; 2],
    /// Point that may not be played on this ply.
    ko: Option<usize>,
    /// Successive passes leading to this board (0..=2).
    passes: u8,
    analysis: OnceLock<Analysis>,
}

impl Board {
    /// Create an empty board of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Result<Self, ActionError> {
        Self::check_dimensions(rows, cols, MAX_POINTS)?;
        Ok(Self::from_grid(Grid::new(rows, cols)))
    }

    /// Reject empty boards and boards above the point cap.
    pub fn check_dimensions(rows: usize, cols: usize, max_points: usize) -> Result<(), ActionError> {
        if rows == 0 || cols == 0 {
            return Err(ActionError::EmptyBoard);
        }
        let max = max_points.min(MAX_POINTS);
        if rows > MAX_LENGTH || cols > MAX_LENGTH || rows * cols > max {
            return Err(ActionError::BoardTooLarge {
                rows,
                cols,
                max,
                max_length: MAX_LENGTH,
            });
        }
        Ok(())
    }

    /// Wrap an existing stone layout with no prisoners, ko or passes.
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            prisoners: [0, 0],
            ko: None,
            passes: 0,
            analysis: OnceLock::new(),
        }
    }

    /// Same board with the given prisoner counts (Black's, White's).
    pub fn with_prisoners(mut self, prisoners: [u32; 2]) -> Self {
        self.prisoners = prisoners;
        self.analysis = OnceLock::new();
        self
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Stones captured by `color`.
    #[inline]
    pub fn prisoners(&self, color: Color) -> u32 {
        self.prisoners[color.index()]
    }

    #[inline]
    pub fn prisoner_counts(&self) -> [u32; 2] {
        self.prisoners
    }

    /// The point that may not be retaken on this ply.
    #[inline]
    pub fn ko(&self) -> Option<Point> {
        self.ko.map(|idx| self.grid.point(idx))
    }

    #[inline]
    pub(crate) fn ko_index(&self) -> Option<usize> {
        self.ko
    }

    #[inline]
    pub fn passes(&self) -> u8 {
        self.passes
    }

    /// Whether two successive passes ended the play on this board.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.passes >= PASSES_TO_END
    }

    /// Stone on a point (None for empty or off-board).
    pub fn stone_at(&self, point: Point) -> Option<Color> {
        self.grid.index(point).and_then(|idx| self.grid.stone(idx))
    }

    fn locate(&self, point: Point) -> Result<usize, PlacementError> {
        self.grid.index(point).ok_or(PlacementError::OutOfBounds {
            row: point.row,
            col: point.col,
        })
    }

    /// Attempt to place a stone.
    ///
    /// # Errors
    /// - [`PlacementError::Occupied`] if the point holds a stone
    /// - [`PlacementError::Ko`] if the point is the ko point and `ignore_ko` is false
    /// - [`PlacementError::Suicide`] if the stone's group has no liberties
    ///   after opponent captures are resolved
    pub fn play(&self, color: Color, point: Point, ignore_ko: bool) -> Result<Board, PlacementError> {
        let idx = self.locate(point)?;
        self.play_index(color, idx, ignore_ko)
    }

    /// Apply a move for `color`; passes never fail.
    pub fn apply(&self, color: Color, mv: Move, ignore_ko: bool) -> Result<Board, PlacementError> {
        match mv {
            Move::Place(point) => self.play(color, point, ignore_ko),
            Move::Pass => Ok(self.pass()),
        }
    }

    pub(crate) fn play_index(&self, color: Color, idx: usize, ignore_ko: bool) -> Result<Board, PlacementError> {
        if self.grid.stone(idx).is_some() {
            return Err(PlacementError::Occupied);
        }
        if !ignore_ko && self.ko == Some(idx) {
            debug!(point = ?self.grid.point(idx), "ko retake rejected");
            return Err(PlacementError::Ko);
        }

        let mut grid = self.grid.clone();
        let captured = grid.place(idx, color);
        let Some(own) = grid.group_at(idx) else {
            return Err(PlacementError::Suicide);
        };
        if own.liberties.is_empty() {
            return Err(PlacementError::Suicide);
        }

        // A ko arises only when one stone is captured by a lone stone that is
        // left with a single liberty: the captured point.
        let ko = match captured.as_slice() {
            [single] if own.len() == 1 && own.liberties.len() == 1 => Some(*single),
            _ => None,
        };

        let mut prisoners = self.prisoners;
        prisoners[color.index()] += captured.len() as u32;
        if !captured.is_empty() {
            debug!(%color, count = captured.len(), ko = ko.is_some(), "stones captured");
        }

        Ok(Board {
            grid,
            prisoners,
            ko,
            passes: 0,
            analysis: OnceLock::new(),
        })
    }

    /// Remove a stone, optionally crediting it as a prisoner to the opponent.
    pub fn erase(&self, point: Point, take_prisoner: bool) -> Result<Board, PlacementError> {
        let idx = self.locate(point)?;
        let mut grid = self.grid.clone();
        let color = grid.remove(idx).ok_or(PlacementError::Vacant)?;
        let mut prisoners = self.prisoners;
        if take_prisoner {
            prisoners[color.opponent().index()] += 1;
        }
        Ok(Board {
            grid,
            prisoners,
            ko: None,
            passes: 0,
            analysis: OnceLock::new(),
        })
    }

    /// The board after a pass: ko cleared, pass count increased (max 2).
    pub fn pass(&self) -> Board {
        Board {
            grid: self.grid.clone(),
            prisoners: self.prisoners,
            ko: None,
            passes: (self.passes + 1).min(PASSES_TO_END),
            analysis: OnceLock::new(),
        }
    }

    /// The same position with both prisoner counts reset.
    pub fn without_prisoners(&self) -> Board {
        Board {
            grid: self.grid.clone(),
            prisoners: [0, 0],
            ko: self.ko,
            passes: self.passes,
            analysis: OnceLock::new(),
        }
    }

    /// The same position as the start of a new playing sequence.
    pub fn restarted(&self) -> Board {
        Board {
            grid: self.grid.clone(),
            prisoners: self.prisoners,
            ko: self.ko,
            passes: 0,
            analysis: self.analysis.clone(),
        }
    }

    /// Whether both boards show the same stones.
    #[inline]
    pub fn same_layout(&self, other: &Board) -> bool {
        self.grid.same_layout(&other.grid)
    }

    /// Territory, life and undecided points under the one-move-extended life
    /// rule. Computed once per board.
    pub fn analysis(&self) -> &Analysis {
        self.analysis
            .get_or_init(|| scoring::analyze(self, LifeMode::Extended))
    }

    /// Analysis under an explicit life rule (not cached).
    pub fn analyze(&self, mode: LifeMode) -> Analysis {
        match mode {
            LifeMode::Extended => self.analysis().clone(),
            LifeMode::Unconditional => scoring::analyze(self, mode),
        }
    }

    /// Final score with komi added to White.
    pub fn score(&self, komi: f32) -> Score {
        Score::new(self, self.analysis(), komi)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.cols() {
            write!(f, " {}", COLUMN_LETTERS[col] as char)?;
        }
        writeln!(f)?;
        for row in 0..self.rows() {
            write!(f, "{:>3}", self.rows() - row)?;
            for col in 0..self.cols() {
                let idx = row * self.cols() + col;
                let ch = match self.grid.stone(idx) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None if self.ko == Some(idx) => '#',
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "Prisoners: Black {} White {}",
            self.prisoners[0], self.prisoners[1]
        )
    }
}

/// Parse a GTP vertex (e.g. `D4`, `pass`) for a board of the given size.
///
/// Columns are letters A..Z without I; rows count from the bottom edge.
pub fn parse_vertex(s: &str, rows: usize, cols: usize) -> Option<Move> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(Move::Pass);
    }
    let mut chars = s.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let col = COLUMN_LETTERS.iter().position(|&c| c as char == letter)?;
    let number: usize = chars.as_str().parse().ok()?;
    if col >= cols || number == 0 || number > rows {
        return None;
    }
    Some(Move::Place(Point::new(rows - number, col)))
}

/// Format a move as a GTP vertex.
pub fn format_vertex(mv: Move, rows: usize) -> String {
    match mv {
        Move::Pass => "pass".to_string(),
        Move::Place(p) => format!("{}{}", COLUMN_LETTERS[p.col] as char, rows - p.row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid_from_rows;

    #[test]
    fn test_first_stone() {
        let board = Board::new(9, 9).unwrap();
        let next = board.play(Color::Black, Point::new(4, 4), false).unwrap();
        assert_eq!(next.grid().count(Color::Black), 1);
        assert_eq!(next.prisoner_counts(), [0, 0]);
        assert_eq!(next.ko(), None);
        // The original snapshot is untouched.
        assert_eq!(board.grid().count(Color::Black), 0);
    }

    #[test]
    fn test_dimension_limits() {
        assert!(matches!(Board::new(0, 5), Err(ActionError::EmptyBoard)));
        assert!(matches!(Board::new(26, 1), Err(ActionError::BoardTooLarge { .. })));
        assert!(Board::new(25, 25).is_ok());
        assert!(Board::new(1, 1).is_ok());
    }

    #[test]
    fn test_occupied() {
        let board = Board::new(5, 5).unwrap();
        let board = board.play(Color::Black, Point::new(2, 2), false).unwrap();
        assert_eq!(
            board.play(Color::White, Point::new(2, 2), false).unwrap_err(),
            PlacementError::Occupied
        );
    }

    #[test]
    fn test_capture_lone_stone() {
        let board = Board::from_grid(grid_from_rows(&[
            ". . . . .",
            ". . X . .",
            ". X O X .",
            ". . . . .",
            ". . . . .",
        ]));
        let next = board.play(Color::Black, Point::new(3, 2), false).unwrap();
        assert_eq!(next.prisoners(Color::Black), 1);
        assert_eq!(next.stone_at(Point::new(2, 2)), None);
        assert_eq!(next.ko(), None);
    }

    #[test]
    fn test_suicide_rejected_unless_capturing() {
        let board = Board::from_grid(grid_from_rows(&[
            ". X .", //
            "X . X",
            ". X .",
        ]));
        assert_eq!(
            board.play(Color::White, Point::new(1, 1), false).unwrap_err(),
            PlacementError::Suicide
        );
        // Multi-stone suicide is rejected too.
        let board = Board::from_grid(grid_from_rows(&[
            ". O X", //
            "O X .",
            "X . .",
        ]));
        assert_eq!(
            board.play(Color::White, Point::new(0, 0), false).unwrap_err(),
            PlacementError::Suicide
        );
    }

    #[test]
    fn test_ko_lasts_one_ply() {
        let board = Board::from_grid(grid_from_rows(&[
            ". X O .",
            "X O . O",
            ". X O .",
        ]));
        // Black captures at (1, 2): one stone taken, lone capturer in atari.
        let after_capture = board.play(Color::Black, Point::new(1, 2), false).unwrap();
        assert_eq!(after_capture.prisoners(Color::Black), 1);
        assert_eq!(after_capture.ko(), Some(Point::new(1, 1)));
        assert_eq!(
            after_capture.play(Color::White, Point::new(1, 1), false).unwrap_err(),
            PlacementError::Ko
        );
        // Ignoring ko (sandbox) allows the retake.
        assert!(after_capture.play(Color::White, Point::new(1, 1), true).is_ok());
        // After an exchange elsewhere the retake is legal again.
        let later = after_capture.pass().pass();
        assert_eq!(later.ko(), None);
        assert!(later.play(Color::White, Point::new(1, 1), false).is_ok());
    }

    #[test]
    fn test_multi_stone_capture_sets_no_ko() {
        let board = Board::from_grid(grid_from_rows(&[
            ". O O X", //
            "X X X .",
        ]));
        let next = board.play(Color::Black, Point::new(0, 0), false).unwrap();
        assert_eq!(next.prisoners(Color::Black), 2);
        assert_eq!(next.ko(), None);
    }

    #[test]
    fn test_pass_counts_and_clears_ko() {
        let board = Board::new(3, 3).unwrap();
        let once = board.pass();
        let twice = once.pass();
        let thrice = twice.pass();
        assert_eq!(once.passes(), 1);
        assert!(twice.is_finished());
        assert_eq!(thrice.passes(), 2);
        let stone = twice.play(Color::Black, Point::new(0, 0), false).unwrap();
        assert_eq!(stone.passes(), 0);
    }

    #[test]
    fn test_erase_takes_prisoner() {
        let board = Board::new(3, 3).unwrap();
        let board = board.play(Color::White, Point::new(1, 1), false).unwrap();
        let erased = board.erase(Point::new(1, 1), true).unwrap();
        assert_eq!(erased.prisoners(Color::Black), 1);
        assert_eq!(erased.erase(Point::new(1, 1), false).unwrap_err(), PlacementError::Vacant);
    }

    #[test]
    fn test_vertex_roundtrip() {
        let mv = parse_vertex("D4", 9, 9);
        assert_eq!(mv, Some(Move::Place(Point::new(5, 3))));
        assert_eq!(format_vertex(Move::Place(Point::new(5, 3)), 9), "D4");
        assert_eq!(parse_vertex("J9", 9, 9), Some(Move::Place(Point::new(0, 8))));
        assert_eq!(parse_vertex("I5", 9, 9), None);
        assert_eq!(parse_vertex("K1", 9, 9), None);
        assert_eq!(parse_vertex("A0", 9, 9), None);
        assert_eq!(parse_vertex("Pass", 9, 9), Some(Move::Pass));
    }
}
