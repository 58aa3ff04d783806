//! goban-solver: a Go rules engine with an exact endgame solver.
//!
//! Boards of any size up to 25x25 are supported. The rules engine handles
//! captures, suicide, ko and long cycles; scoring relies on Benson's
//! unconditional life plus a one-move refinement. When only a few points
//! remain contested, the solver finds every best move exactly.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits and solver defaults
//! - [`config`] - Game and solver settings
//! - [`error`] - Placement, action and complexity failures
//! - [`grid`] - Intersections, groups and Benson's algorithm
//! - [`board`] - Immutable board snapshots and move legality
//! - [`scoring`] - Life, territory and scores
//! - [`repetition`] - Long-cycle detection
//! - [`solver`] - Negamax endgame search
//! - [`model`] - Undo/redo history and the action API
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use goban_solver::config::GameConfig;
//! use goban_solver::grid::Color;
//! use goban_solver::model::GameModel;
//!
//! let mut game = GameModel::new(GameConfig::default());
//! game.new_board(9, 9).unwrap();
//! let played = game.place_stone(4, 4).unwrap();
//! assert_eq!(played.board.grid().count(Color::Black), 1);
//! assert_eq!(game.to_move(), Color::White);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod gtp;
pub mod model;
pub mod repetition;
pub mod scoring;
pub mod solver;
