//! Exact endgame solver.
//!
//! The solver searches the contested points of a position with negamax and
//! alpha-beta pruning, deepening iteratively until the result no longer
//! depends on the depth horizon. It refuses positions with too many contested
//! points and reports a complexity failure rather than guessing when nothing
//! finished in time.
//!
//! # Example
//!
//! ```
//! use goban_solver::board::Board;
//! use goban_solver::config::SolverConfig;
//! use goban_solver::grid::{grid_from_rows, Color};
//! use goban_solver::solver::{solve_position, SolveStatus};
//!
//! // Both groups have two eyes; the middle column is contested.
//! let board = Board::from_grid(grid_from_rows(&[
//!     ". X . O .",
//!     "X X . O O",
//!     ". X . O .",
//! ]));
//! let solution = solve_position(&board, Color::Black, 0.5, &SolverConfig::default()).unwrap();
//! assert_eq!(solution.status, SolveStatus::Exact);
//! // Neutral points are worth nothing, so Black ends half a point behind.
//! assert_eq!(solution.root.value, -16);
//! ```

pub mod ordering;
mod search;
pub mod symmetry;
pub mod tt;
pub mod zobrist;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::board::{Board, Move};
use crate::config::SolverConfig;
use crate::constants::{CYCLE_WIN, POINT};
use crate::error::ComplexityError;
use crate::grid::Color;
use crate::scoring::LifeMode;

pub use search::solve;

/// A solved node: its value for the side to move and the moves reaching it.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveNode {
    /// Fixed-point value from the mover's side ([`POINT`] units per point).
    pub value: i32,
    /// Remaining search depth the value was computed with.
    pub depth: u8,
    /// Whether the value is independent of the depth horizon.
    pub complete: bool,
    /// Every move achieving `value`, with the node it leads to. Empty at
    /// leaves.
    pub best: Vec<(Move, Arc<SolveNode>)>,
}

/// Value of a node in game terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeValue {
    /// Final margin in points for the side to move.
    Points(f32),
    /// The side to move wins through a long cycle.
    CycleWin,
    /// The side to move loses through a long cycle.
    CycleLoss,
}

impl SolveNode {
    pub(crate) fn leaf(value: i32, depth: u8, complete: bool) -> Self {
        Self {
            value,
            depth,
            complete,
            best: Vec::new(),
        }
    }

    pub fn child(&self, mv: Move) -> Option<&Arc<SolveNode>> {
        self.best.iter().find(|(m, _)| *m == mv).map(|(_, node)| node)
    }

    pub fn best_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.best.iter().map(|(mv, _)| *mv)
    }

    pub fn outcome(&self) -> NodeValue {
        if self.value >= CYCLE_WIN {
            NodeValue::CycleWin
        } else if self.value <= -CYCLE_WIN {
            NodeValue::CycleLoss
        } else {
            NodeValue::Points(self.value as f32 / POINT as f32)
        }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Points(p) => write!(f, "{p:+}"),
            NodeValue::CycleWin => write!(f, "long cycle win"),
            NodeValue::CycleLoss => write!(f, "long cycle loss"),
        }
    }
}

/// Why a result is not exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// The deepest configured iteration still hit the horizon.
    Depth,
    /// The time budget ran out before the next iteration finished.
    Budget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The value is exact.
    Exact,
    /// Best result of the last completed iteration.
    Partial { depth: u8, limit: SearchLimit },
}

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub tt_probes: u64,
    /// Probes that returned a usable value.
    pub tt_hits: u64,
    pub tt_entries: usize,
    pub cutoffs: u64,
    /// Cutoffs on the first move tried.
    pub first_move_cutoffs: u64,
    /// Deepest completed iteration.
    pub depth: u8,
    pub elapsed: Duration,
    pub life_mode: Option<LifeMode>,
}

impl SearchStats {
    pub fn tt_hit_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct Solution {
    pub to_move: Color,
    pub root: Arc<SolveNode>,
    pub status: SolveStatus,
    pub stats: SearchStats,
}

impl Solution {
    /// The solution seen from the position after `mv`, if `mv` is one of the
    /// recorded best moves.
    pub fn advance(&self, mv: Move) -> Option<Solution> {
        let child = self.root.child(mv)?;
        Some(Solution {
            to_move: self.to_move.opponent(),
            root: Arc::clone(child),
            status: self.status,
            stats: self.stats.clone(),
        })
    }

    pub fn best_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.root.best_moves()
    }
}

/// Everything a solve needs.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub board: Board,
    pub to_move: Color,
    /// Boards of the current playing sequence ending with `board`; used for
    /// long-cycle detection.
    pub history: Vec<Board>,
    pub komi: f32,
    pub config: SolverConfig,
}

impl SolveRequest {
    pub fn new(board: Board, to_move: Color, komi: f32, config: SolverConfig) -> Self {
        Self {
            board,
            to_move,
            history: Vec::new(),
            komi,
            config,
        }
    }

    pub fn with_history(mut self, history: Vec<Board>) -> Self {
        self.history = history;
        self
    }
}

/// Solve a position without history or cancellation.
pub fn solve_position(
    board: &Board,
    to_move: Color,
    komi: f32,
    config: &SolverConfig,
) -> Result<Solution, ComplexityError> {
    let request = SolveRequest::new(board.clone(), to_move, komi, config.clone());
    solve(&request, &AtomicBool::new(false))
}

/// A solve running on a worker thread.
///
/// Dropping the handle cancels the search.
#[derive(Debug)]
pub struct SolveHandle {
    receiver: Receiver<Result<Solution, ComplexityError>>,
    cancel: Arc<AtomicBool>,
}

impl SolveHandle {
    /// Ask the search to stop at its next check.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// The result, if the worker has finished.
    pub fn try_result(&self) -> Option<Result<Solution, ComplexityError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ComplexityError::Cancelled)),
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> Result<Solution, ComplexityError> {
        self.receiver
            .recv()
            .unwrap_or(Err(ComplexityError::Cancelled))
    }
}

impl Drop for SolveHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run a solve on a worker thread.
pub fn spawn_solve(request: SolveRequest) -> SolveHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = channel();
    let flag = Arc::clone(&cancel);
    thread::spawn(move || {
        let result = solve(&request, &flag);
        let _ = tx.send(result);
    });
    SolveHandle {
        receiver: rx,
        cancel,
    }
}
