//! Error types returned by the rules engine, the game model and the solver.
//!
//! All three kinds are recoverable: the requested operation is rejected and
//! the state it was applied to is left untouched.

use std::time::Duration;

use thiserror::Error;

use crate::model::Mode;

/// Rule-violating stone placement or erasure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The point already holds a stone.
    #[error("illegal move: point not empty")]
    Occupied,
    /// The placed stone's group would have no liberties after captures.
    #[error("illegal move: suicide")]
    Suicide,
    /// The move retakes the ko.
    #[error("illegal move: retakes ko")]
    Ko,
    /// Erasure was requested on an empty point.
    #[error("no stone to erase")]
    Vacant,
    /// The point lies outside the board.
    #[error("point ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },
}

/// An action that cannot be carried out in the current state. The model is
/// left exactly as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("nothing to undo in the current sequence")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("board {rows}x{cols} exceeds the limit of {max} points or {max_length} per side")]
    BoardTooLarge {
        rows: usize,
        cols: usize,
        max: usize,
        max_length: usize,
    },
    #[error("board dimensions must be positive")]
    EmptyBoard,
    #[error("{action} is not available in {mode:?} mode")]
    InvalidInMode { action: &'static str, mode: Mode },
    #[error("no stone colour selected")]
    NoStoneColor,
    #[error("komi {0} is not a multiple of 0.5 within the allowed range")]
    InvalidKomi(f32),
}

/// The solver could not produce a result within its configured bounds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComplexityError {
    #[error("too complex: {count} undecided points (limit {limit})")]
    TooManyUndecided { count: usize, limit: usize },
    #[error("too complex: no search iteration finished within {budget:?}")]
    BudgetExhausted { budget: Duration },
    #[error("search cancelled")]
    Cancelled,
}

/// Umbrella error for the action API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GoError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Complexity(#[from] ComplexityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(PlacementError::Ko.to_string(), "illegal move: retakes ko");
        let err: GoError = ComplexityError::TooManyUndecided { count: 9, limit: 7 }.into();
        assert_eq!(err.to_string(), "too complex: 9 undecided points (limit 7)");
    }

    #[test]
    fn test_from_conversions() {
        let err: GoError = PlacementError::Suicide.into();
        assert!(matches!(err, GoError::Placement(PlacementError::Suicide)));
        let err: GoError = ActionError::NothingToRedo.into();
        assert!(matches!(err, GoError::Action(ActionError::NothingToRedo)));
    }
}
