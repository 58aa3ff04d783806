//! Game and solver settings.
//!
//! Both structs default to the values in [`crate::constants`] and are adjusted
//! through `with_*` builders, typically from command-line flags.

use std::time::Duration;

use crate::constants::{
    DEFAULT_BUDGET, DEFAULT_KOMI, MAX_KOMI, MAX_POINTS, MAX_SEARCH_DEPTH, MAX_UNDECIDED,
    SYMMETRY_MAX_PLY, SYMMETRY_MAX_POINTS,
};
use crate::error::ActionError;

/// When the search may pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PassRule {
    /// Only when no contested point can be played.
    #[default]
    WhenBlocked,
    /// At every node, after the placements.
    Always,
}

/// Limits for one best-move computation.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Undecided points above which a solve is refused.
    pub max_undecided: usize,
    /// Deepest nominal iteration of iterative deepening.
    pub max_depth: u8,
    /// Wall-clock budget.
    pub budget: Duration,
    /// Boards up to this many points are canonicalized under symmetry.
    pub symmetry_max_points: usize,
    /// Symmetry canonicalization is applied down to this ply.
    pub symmetry_max_ply: u8,
    /// Use Benson-only life inside a contested area walled off by
    /// unconditionally alive chains.
    pub fast_path: bool,
    pub pass_rule: PassRule,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_undecided: MAX_UNDECIDED,
            max_depth: MAX_SEARCH_DEPTH,
            budget: DEFAULT_BUDGET,
            symmetry_max_points: SYMMETRY_MAX_POINTS,
            symmetry_max_ply: SYMMETRY_MAX_PLY,
            fast_path: true,
            pass_rule: PassRule::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_max_undecided(mut self, max_undecided: usize) -> Self {
        self.max_undecided = max_undecided;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_fast_path(mut self, enabled: bool) -> Self {
        self.fast_path = enabled;
        self
    }

    pub fn with_pass_rule(mut self, pass_rule: PassRule) -> Self {
        self.pass_rule = pass_rule;
        self
    }

    /// Disable symmetry canonicalization.
    pub fn without_symmetry(mut self) -> Self {
        self.symmetry_max_points = 0;
        self
    }
}

/// Settings that hold for a whole game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Points added to White's score.
    pub komi: f32,
    /// Largest board `new_board` accepts, in points.
    pub max_points: usize,
    /// Check for long cycles after every placement.
    pub test_repetition: bool,
    pub solver: SolverConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            komi: DEFAULT_KOMI,
            max_points: MAX_POINTS,
            test_repetition: true,
            solver: SolverConfig::default(),
        }
    }
}

impl GameConfig {
    /// Set komi. It must be a multiple of 0.5 no larger than [`MAX_KOMI`] in
    /// magnitude.
    pub fn with_komi(mut self, komi: f32) -> Result<Self, ActionError> {
        validate_komi(komi)?;
        self.komi = komi;
        Ok(self)
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points.min(MAX_POINTS);
        self
    }

    pub fn with_repetition_test(mut self, enabled: bool) -> Self {
        self.test_repetition = enabled;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}

pub(crate) fn validate_komi(komi: f32) -> Result<(), ActionError> {
    if !komi.is_finite() || komi.abs() > MAX_KOMI || (komi * 2.0).fract() != 0.0 {
        return Err(ActionError::InvalidKomi(komi));
    }
    Ok(())
}
