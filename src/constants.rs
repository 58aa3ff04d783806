//! Constants for board limits, scoring, and solver parameters.
//!
//! Boards are sized at runtime (see [`crate::board::Board::new`]), so this
//! module only carries the caps and the defaults that [`crate::config`] builds
//! its `Default` implementations from.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Maximum number of rows or columns. Column letters A..Z without I give 25.
pub const MAX_LENGTH: usize = 25;

/// Maximum number of intersections accepted by `new_board`.
pub const MAX_POINTS: usize = MAX_LENGTH * MAX_LENGTH;

/// Board side used when nothing else is specified.
pub const DEFAULT_SIZE: usize = 9;

/// Column letters in GTP order (no `I`).
pub const COLUMN_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Scoring
// =============================================================================

/// Default komi added to White's score.
pub const DEFAULT_KOMI: f32 = 6.5;

/// Largest accepted komi magnitude.
pub const MAX_KOMI: f32 = 99.5;

/// Passes that end a playing sequence.
pub const PASSES_TO_END: u8 = 2;

/// Plies skipped from the end of the history when looking for long cycles;
/// shorter cycles are the ko rule's business.
pub const LONG_CYCLE_MIN: usize = 3;

// =============================================================================
// Solver
// =============================================================================

/// Maximum number of undecided points a solve is attempted on.
pub const MAX_UNDECIDED: usize = 7;

/// Maximum nominal depth of iterative deepening.
pub const MAX_SEARCH_DEPTH: u8 = 24;

/// Default wall-clock budget for one solve.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(10);

/// Boards with at most this many points are canonicalized under symmetry.
pub const SYMMETRY_MAX_POINTS: usize = 49;

/// Symmetry canonicalization is applied down to this ply from the root.
pub const SYMMETRY_MAX_PLY: u8 = 4;

/// Fixed-point units per point of score. Komi needs half points; the static
/// heuristic stays strictly below one unit of a half point.
pub const POINT: i32 = 32;

/// Value of a won long cycle. Larger than any score on a capped board.
pub const CYCLE_WIN: i32 = POINT * (MAX_POINTS as i32) * 4;

/// Bound used as the alpha-beta window.
pub const INF: i32 = CYCLE_WIN + 1;

/// Maximum search ply tracked by the killer table.
pub const MAX_PLY: usize = 64;

/// Number of killer moves remembered per ply.
pub const KILLERS_PER_PLY: usize = 2;

/// Nodes between two wall-clock checks.
pub const CLOCK_CHECK_PERIOD: u64 = 256;

/// Seed for Zobrist keys, fixed so signatures are reproducible.
pub const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
