//! Game history and the action API.
//!
//! [`GameModel`] keeps a linear list of boards with a cursor. Undo moves the
//! cursor back without discarding anything; redo moves it forward again until
//! some other action truncates the boards past the cursor. A sequence
//! boundary (mode switch, prisoner reset, long cycle, end of play by passes)
//! cannot be crossed by undo, and long cycles are only looked for after it.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tracing::{debug, info};

use crate::board::{Board, Move};
use crate::config::{validate_komi, GameConfig};
use crate::constants::DEFAULT_SIZE;
use crate::error::{ActionError, GoError};
use crate::grid::{Color, Grid, Point};
use crate::repetition::{self, LongCycle};
use crate::scoring::Score;
use crate::solver::{self, spawn_solve, Solution, SolveHandle, SolveRequest, SolveStatus};

/// Play enforces the rules; Sandbox is free setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Alternating play with ko, repetition testing, scoring and solving.
    Play,
    /// Free placement: ko and repetition are ignored, no scoring or solving.
    Sandbox,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Play => write!(f, "play"),
            Mode::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// Who acts on the next placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternation {
    /// Black and White take turns.
    Alternate,
    /// Every placement is a stone of this color.
    Only(Color),
    /// Placements remove stones instead.
    Erase { take_prisoner: bool },
}

/// What a placement or pass did.
#[derive(Debug, Clone)]
pub struct Played {
    /// The board right after the action.
    pub board: Board,
    /// Stones captured by the action.
    pub captured: u32,
    /// A long cycle completed by the action.
    pub long_cycle: Option<LongCycle>,
    /// Score of a play ended by successive passes.
    pub game_over: Option<Score>,
}

/// A solved tree following the live board along its best lines.
#[derive(Debug)]
struct CachedSolution {
    /// History index the solution belongs to.
    ply: usize,
    solution: Solution,
    /// Solutions of the earlier plies on the way here, oldest first.
    parents: Vec<Solution>,
}

/// A best-move request waiting to be polled.
#[derive(Debug)]
enum Pending {
    Worker(SolveHandle),
    /// Answered from the cached solution.
    Ready(Solution),
}

/// The game: history, cursor, mode and the cached solver result.
#[derive(Debug)]
pub struct GameModel {
    config: GameConfig,
    history: Vec<Board>,
    /// Color to move at each board of `history`.
    turns: Vec<Color>,
    cursor: usize,
    sequence_start: usize,
    mode: Mode,
    alternation: Alternation,
    solution: Option<CachedSolution>,
    /// Bumped by every action that changes the live board or its settings.
    generation: u64,
    pending: Option<(u64, Pending)>,
}

impl Default for GameModel {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameModel {
    /// An empty default-size board in Play mode, Black to move.
    pub fn new(config: GameConfig) -> Self {
        let board = Board::from_grid(Grid::new(DEFAULT_SIZE, DEFAULT_SIZE));
        Self::from_board(config, board, Color::Black)
    }

    /// Start from an arbitrary position.
    pub fn from_board(config: GameConfig, board: Board, to_move: Color) -> Self {
        Self {
            config,
            history: vec![board.restarted()],
            turns: vec![to_move],
            cursor: 0,
            sequence_start: 0,
            mode: Mode::Play,
            alternation: Alternation::Alternate,
            solution: None,
            generation: 0,
            pending: None,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The live board.
    pub fn board(&self) -> &Board {
        &self.history[self.cursor]
    }

    /// Color of the next stone under [`Alternation::Alternate`].
    pub fn to_move(&self) -> Color {
        self.turns[self.cursor]
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn alternation(&self) -> Alternation {
        self.alternation
    }

    pub fn komi(&self) -> f32 {
        self.config.komi
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Boards of the current playing sequence, ending with the live board.
    pub fn sequence(&self) -> &[Board] {
        &self.history[self.sequence_start..=self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > self.sequence_start
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// The cached solver result for the live board, if any.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution
            .as_ref()
            .filter(|c| c.ply == self.cursor)
            .map(|c| &c.solution)
    }

    /// Counter of state changes; a background solve started under an older
    /// generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The color the next placement puts down.
    pub fn stone_color(&self) -> Result<Color, ActionError> {
        match self.alternation {
            Alternation::Alternate => Ok(self.to_move()),
            Alternation::Only(color) => Ok(color),
            Alternation::Erase { .. } => Err(ActionError::NoStoneColor),
        }
    }

    /// Whether placing the next stone at `point` would complete a long
    /// cycle. Always false when repetition is not tested.
    pub fn is_repetition_imminent(&self, point: Point) -> bool {
        if self.mode != Mode::Play || !self.config.test_repetition {
            return false;
        }
        let Ok(color) = self.stone_color() else {
            return false;
        };
        repetition::would_repeat(self.sequence(), color, point, false)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Replace the game with an empty board.
    pub fn new_board(&mut self, rows: usize, cols: usize) -> Result<&Board, ActionError> {
        Board::check_dimensions(rows, cols, self.config.max_points)?;
        self.touch();
        self.solution = None;
        self.history = vec![Board::from_grid(Grid::new(rows, cols))];
        self.turns = vec![Color::Black];
        self.cursor = 0;
        self.sequence_start = 0;
        info!(rows, cols, mode = %self.mode, "new board");
        Ok(self.board())
    }

    /// Place (or, under [`Alternation::Erase`], remove) a stone.
    ///
    /// # Errors
    /// A [`GoError::Placement`] for an illegal move; nothing changes.
    pub fn place_stone(&mut self, row: usize, col: usize) -> Result<Played, GoError> {
        let point = Point::new(row, col);
        let board = self.board();

        let (next, mover) = match self.alternation {
            Alternation::Erase { take_prisoner } => (board.erase(point, take_prisoner), None),
            _ => {
                let color = self.stone_color()?;
                let ignore_ko = self.mode == Mode::Sandbox;
                (board.play(color, point, ignore_ko), Some(color))
            }
        };
        let next = next.inspect_err(|err| debug!(?point, %err, "placement rejected"))?;
        let captured = mover.map_or(0, |c| next.prisoners(c) - board.prisoners(c));
        let to_move = mover.map_or(self.to_move(), Color::opponent);

        self.touch();
        self.push(next.clone(), to_move);
        match mover {
            Some(_) => self.advance_solution(Move::Place(point)),
            None => self.solution = None,
        }

        let mut long_cycle = None;
        if mover.is_some() && self.mode == Mode::Play && self.config.test_repetition {
            long_cycle = repetition::long_cycle(self.sequence());
            if let Some(cycle) = long_cycle {
                info!(%cycle, "long cycle");
                self.restart_sequence();
            }
        }

        Ok(Played {
            board: next,
            captured,
            long_cycle,
            game_over: None,
        })
    }

    /// Pass for the next color. Two successive passes in Play mode score the
    /// board and start a new sequence.
    pub fn pass_turn(&mut self) -> Result<Played, GoError> {
        let color = match self.alternation {
            Alternation::Only(color) => color,
            _ => self.to_move(),
        };
        let next = self.board().pass();

        self.touch();
        self.push(next.clone(), color.opponent());
        self.advance_solution(Move::Pass);

        let mut game_over = None;
        if self.mode == Mode::Play && next.is_finished() {
            let score = next.score(self.config.komi);
            info!(result = %score.outcome(), "play ended by passes");
            game_over = Some(score);
            self.restart_sequence();
        }

        Ok(Played {
            board: next,
            captured: 0,
            long_cycle: None,
            game_over,
        })
    }

    /// Step back one board within the current sequence.
    pub fn undo(&mut self) -> Result<&Board, ActionError> {
        if !self.can_undo() {
            return Err(ActionError::NothingToUndo);
        }
        self.touch();
        self.solution = self.solution.take().and_then(|mut cached| {
            if cached.ply != self.cursor {
                return None;
            }
            let parent = cached.parents.pop()?;
            cached.ply -= 1;
            cached.solution = parent;
            Some(cached)
        });
        self.cursor -= 1;
        Ok(self.board())
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self) -> Result<&Board, ActionError> {
        if !self.can_redo() {
            return Err(ActionError::NothingToRedo);
        }
        self.touch();
        self.solution = None;
        self.cursor += 1;
        Ok(self.board())
    }

    /// Clear both prisoner counts. This starts a new sequence, so it cannot
    /// be undone.
    pub fn reset_prisoners(&mut self) {
        self.touch();
        self.solution = None;
        self.history.truncate(self.cursor + 1);
        self.turns.truncate(self.cursor + 1);
        self.history[self.cursor] = self.history[self.cursor].without_prisoners();
        self.sequence_start = self.cursor;
        info!("prisoners reset");
    }

    /// Score the live board.
    pub fn score(&self) -> Result<Score, ActionError> {
        self.require_play("score")?;
        Ok(self.board().score(self.config.komi))
    }

    /// Solve the live board, reusing a cached result when there is one.
    ///
    /// `budget` overrides the configured time budget.
    pub fn best_move(&mut self, budget: Option<Duration>) -> Result<Solution, GoError> {
        self.require_play("best move")?;
        if let Some(solution) = self.solution() {
            debug!("reusing cached solution");
            return Ok(solution.clone());
        }
        let request = self.solve_request(budget);
        let solution = solver::solve(&request, &AtomicBool::new(false))?;
        self.cache(&solution);
        Ok(solution)
    }

    /// Start solving the live board on a worker thread. A solve already
    /// running is cancelled. A cached result is handed to the next poll
    /// instead.
    pub fn start_best_move(&mut self, budget: Option<Duration>) -> Result<(), ActionError> {
        self.require_play("best move")?;
        let pending = match self.solution() {
            Some(solution) => {
                debug!("reusing cached solution");
                Pending::Ready(solution.clone())
            }
            None => Pending::Worker(spawn_solve(self.solve_request(budget))),
        };
        self.pending = Some((self.generation, pending));
        Ok(())
    }

    /// The result of the background solve, once it is available.
    ///
    /// Returns None while it runs, when none was started, and when the live
    /// board changed since it was started.
    pub fn poll_best_move(&mut self) -> Option<Result<Solution, GoError>> {
        let (generation, pending) = self.pending.take()?;
        if generation != self.generation {
            debug!("dropping stale solve");
            return None;
        }
        match pending {
            Pending::Ready(solution) => Some(Ok(solution)),
            Pending::Worker(handle) => {
                let Some(result) = handle.try_result() else {
                    self.pending = Some((generation, Pending::Worker(handle)));
                    return None;
                };
                if let Ok(solution) = &result {
                    self.cache(solution);
                }
                Some(result.map_err(GoError::from))
            }
        }
    }

    /// Whether a best-move request is waiting to be polled.
    pub fn is_solving(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch between Play and Sandbox. The live board starts a new
    /// sequence; entering Play restores alternating turns.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.touch();
        self.solution = None;
        if mode == Mode::Play {
            self.set_alternate_from(self.alternation);
        }
        self.mode = mode;
        self.restart_sequence();
        info!(%mode, "mode changed");
    }

    /// Choose who places the next stone. Play mode only alternates.
    pub fn set_alternation(&mut self, alternation: Alternation) -> Result<(), ActionError> {
        if self.mode == Mode::Play && alternation != Alternation::Alternate {
            return Err(ActionError::InvalidInMode {
                action: "fixed stone color or erasing",
                mode: self.mode,
            });
        }
        self.touch();
        if alternation == Alternation::Alternate {
            self.set_alternate_from(self.alternation);
        } else {
            self.alternation = alternation;
        }
        Ok(())
    }

    /// Turn long-cycle checks after Play-mode placements on or off.
    pub fn set_repetition_test(&mut self, enabled: bool) {
        self.config.test_repetition = enabled;
        debug!(enabled, "repetition test");
    }

    pub fn set_komi(&mut self, komi: f32) -> Result<(), ActionError> {
        validate_komi(komi)?;
        self.touch();
        self.solution = None;
        self.config.komi = komi;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_play(&self, action: &'static str) -> Result<(), ActionError> {
        match self.mode {
            Mode::Play => Ok(()),
            mode => Err(ActionError::InvalidInMode { action, mode }),
        }
    }

    /// Invalidate background work started before this action.
    fn touch(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    fn push(&mut self, board: Board, to_move: Color) {
        self.history.truncate(self.cursor + 1);
        self.turns.truncate(self.cursor + 1);
        self.history.push(board);
        self.turns.push(to_move);
        self.cursor += 1;
    }

    /// Make the live board the first of a new sequence.
    fn restart_sequence(&mut self) {
        self.history.truncate(self.cursor + 1);
        self.turns.truncate(self.cursor + 1);
        self.history[self.cursor] = self.history[self.cursor].restarted();
        self.sequence_start = self.cursor;
        self.solution = None;
        debug!(start = self.cursor, "new sequence");
    }

    fn set_alternate_from(&mut self, previous: Alternation) {
        if let Alternation::Erase { .. } = previous {
            self.turns[self.cursor] = Color::Black;
        }
        self.alternation = Alternation::Alternate;
    }

    /// Follow the cached solution along a move just played from its ply.
    fn advance_solution(&mut self, mv: Move) {
        let Some(mut cached) = self.solution.take() else {
            return;
        };
        if cached.ply + 1 != self.cursor || self.alternation != Alternation::Alternate {
            return;
        }
        if let Some(next) = cached.solution.advance(mv) {
            let previous = std::mem::replace(&mut cached.solution, next);
            cached.parents.push(previous);
            cached.ply = self.cursor;
            self.solution = Some(cached);
        }
    }

    fn cache(&mut self, solution: &Solution) {
        if solution.status == SolveStatus::Exact {
            self.solution = Some(CachedSolution {
                ply: self.cursor,
                solution: solution.clone(),
                parents: Vec::new(),
            });
        }
    }

    fn solve_request(&self, budget: Option<Duration>) -> SolveRequest {
        let mut config = self.config.solver.clone();
        if let Some(budget) = budget {
            config = config.with_budget(budget);
        }
        SolveRequest::new(self.board().clone(), self.to_move(), self.config.komi, config)
            .with_history(self.sequence().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacementError;
    use crate::grid::grid_from_rows;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn model(rows: &[&str], komi: f32) -> GameModel {
        let config = GameConfig::default().with_komi(komi).unwrap();
        GameModel::from_board(config, Board::from_grid(grid_from_rows(rows)), Color::Black)
    }

    fn contested() -> GameModel {
        model(
            &[
                ". X . O .", //
                "X X . O O",
                ". X . O .",
            ],
            0.5,
        )
    }

    #[test]
    fn test_first_stone() {
        let mut game = GameModel::default();
        let played = game.place_stone(4, 4).unwrap();
        assert_eq!(played.board.grid().count(Color::Black), 1);
        assert_eq!(played.board.prisoner_counts(), [0, 0]);
        assert_eq!(played.board.ko(), None);
        assert_eq!(game.to_move(), Color::White);
    }

    #[test]
    fn test_capture_lone_stone() {
        let mut game = model(&[". X .", "X O X", ". . ."], 0.5);
        let played = game.place_stone(2, 1).unwrap();
        assert_eq!(played.captured, 1);
        assert_eq!(game.board().prisoners(Color::Black), 1);
        assert_eq!(game.board().stone_at(Point::new(1, 1)), None);
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut game = GameModel::default();
        game.place_stone(0, 0).unwrap();
        let generation = game.generation();
        let err = game.place_stone(0, 0).unwrap_err();
        assert_eq!(err, GoError::Placement(PlacementError::Occupied));
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.generation(), generation);
        assert!(game.can_undo());
    }

    #[test]
    fn test_undo_redo() {
        let mut game = GameModel::default();
        assert_eq!(game.undo().unwrap_err(), ActionError::NothingToUndo);
        game.place_stone(0, 0).unwrap();
        game.place_stone(1, 1).unwrap();
        game.undo().unwrap();
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.board().stone_at(Point::new(1, 1)), None);
        game.redo().unwrap();
        assert_eq!(game.board().stone_at(Point::new(1, 1)), Some(Color::White));
        assert_eq!(game.redo().unwrap_err(), ActionError::NothingToRedo);

        // Any other action drops the undone boards.
        game.undo().unwrap();
        game.place_stone(2, 2).unwrap();
        assert!(!game.can_redo());
        assert_eq!(game.board().stone_at(Point::new(2, 2)), Some(Color::White));
    }

    #[test]
    fn test_mode_switch_is_a_boundary() {
        let mut game = GameModel::default();
        game.place_stone(0, 0).unwrap();
        game.set_mode(Mode::Sandbox);
        assert!(!game.can_undo());
        assert_eq!(game.undo().unwrap_err(), ActionError::NothingToUndo);
        // Earlier boards are still there.
        assert_eq!(game.board().stone_at(Point::new(0, 0)), Some(Color::Black));
    }

    #[test]
    fn test_sandbox_rules() {
        let mut game = model(&[". X O .", "X O . O", ". X O ."], 0.5);
        game.set_mode(Mode::Sandbox);
        assert!(matches!(
            game.score().unwrap_err(),
            ActionError::InvalidInMode { mode: Mode::Sandbox, .. }
        ));
        assert!(game.best_move(None).is_err());

        // Black takes the ko; White may retake at once in sandbox.
        game.place_stone(1, 2).unwrap();
        assert_eq!(game.board().ko(), Some(Point::new(1, 1)));
        let played = game.place_stone(1, 1).unwrap();
        assert_eq!(played.captured, 1);
    }

    #[test]
    fn test_ko_enforced_in_play() {
        let mut game = model(&[". X O .", "X O . O", ". X O ."], 0.5);
        game.place_stone(1, 2).unwrap();
        let err = game.place_stone(1, 1).unwrap_err();
        assert_eq!(err, GoError::Placement(PlacementError::Ko));
    }

    #[test]
    fn test_alternation_in_sandbox() {
        let mut game = GameModel::default();
        assert!(game.set_alternation(Alternation::Only(Color::White)).is_err());
        game.set_mode(Mode::Sandbox);
        game.set_alternation(Alternation::Only(Color::White)).unwrap();
        game.place_stone(0, 0).unwrap();
        game.place_stone(0, 1).unwrap();
        assert_eq!(game.board().grid().count(Color::White), 2);

        game.set_alternation(Alternation::Erase { take_prisoner: true }).unwrap();
        let played = game.pass_turn().unwrap();
        assert_eq!(played.board.passes(), 1);
        assert_eq!(played.board.grid().count(Color::White), 2);
        game.place_stone(0, 0).unwrap();
        assert_eq!(game.board().prisoners(Color::Black), 1);
        let err = game.place_stone(0, 0).unwrap_err();
        assert_eq!(err, GoError::Placement(PlacementError::Vacant));

        // Back to play: alternation resets and Black starts.
        game.set_mode(Mode::Play);
        assert_eq!(game.alternation(), Alternation::Alternate);
        assert_eq!(game.to_move(), Color::Black);
    }

    #[test]
    fn test_two_passes_end_play() {
        let mut game = GameModel::default();
        game.place_stone(4, 4).unwrap();
        assert!(game.pass_turn().unwrap().game_over.is_none());
        let played = game.pass_turn().unwrap();
        let score = played.game_over.unwrap();
        assert!(played.board.is_finished());
        assert_eq!(score.komi, game.komi());
        // The live board starts a new sequence.
        assert_eq!(game.board().passes(), 0);
        assert!(!game.can_undo());
    }

    #[test]
    fn test_reset_prisoners_is_irreversible() {
        let mut game = model(&[". X .", "X O X", ". . ."], 0.5);
        game.place_stone(2, 1).unwrap();
        game.reset_prisoners();
        assert_eq!(game.board().prisoner_counts(), [0, 0]);
        assert!(!game.can_undo());
    }

    #[test]
    fn test_new_board_limits() {
        let mut game = GameModel::new(GameConfig::default().with_max_points(100));
        assert!(matches!(
            game.new_board(11, 10).unwrap_err(),
            ActionError::BoardTooLarge { max: 100, .. }
        ));
        assert_eq!(game.new_board(0, 3).unwrap_err(), ActionError::EmptyBoard);
        let board = game.new_board(5, 7).unwrap();
        assert_eq!((board.rows(), board.cols()), (5, 7));
        assert_eq!(game.to_move(), Color::Black);
    }

    #[test]
    fn test_komi_validation() {
        let mut game = GameModel::default();
        assert_eq!(game.set_komi(0.25).unwrap_err(), ActionError::InvalidKomi(0.25));
        game.set_komi(-3.5).unwrap();
        assert_eq!(game.komi(), -3.5);
    }

    #[test]
    fn test_solution_follows_best_moves() {
        let mut game = contested();
        let solution = game.best_move(None).unwrap();
        assert_eq!(solution.status, SolveStatus::Exact);
        let value = solution.root.value;

        let mv = solution.best_moves().next().unwrap();
        match mv {
            Move::Place(p) => game.place_stone(p.row, p.col).map(|_| ()).unwrap(),
            Move::Pass => game.pass_turn().map(|_| ()).unwrap(),
        }
        let cached = game.solution().unwrap();
        assert_eq!(cached.to_move, Color::White);
        assert_eq!(cached.root.value, -value);

        game.undo().unwrap();
        assert_eq!(game.solution().unwrap().root.value, value);

        game.new_board(3, 3).unwrap();
        assert!(game.solution().is_none());
    }

    #[test]
    fn test_solution_discarded_off_tree() {
        let mut game = contested();
        game.best_move(None).unwrap();
        game.set_komi(1.5).unwrap();
        assert!(game.solution().is_none());
    }

    #[test]
    fn test_background_solve() {
        let mut game = contested();
        game.start_best_move(None).unwrap();
        assert!(game.is_solving());
        let started = Instant::now();
        let result = loop {
            if let Some(result) = game.poll_best_move() {
                break result;
            }
            assert!(started.elapsed() < Duration::from_secs(30));
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(result.unwrap().status, SolveStatus::Exact);
        assert!(game.solution().is_some());
    }

    #[test]
    fn test_stale_background_solve_is_dropped() {
        let mut game = contested();
        game.start_best_move(None).unwrap();
        game.place_stone(0, 2).unwrap();
        assert!(!game.is_solving());
        assert!(game.poll_best_move().is_none());
    }

    /// Two kos on a 4x6 board: White's stone at C1 and Black's at D4 can each
    /// be captured.
    fn double_ko() -> GameModel {
        model(
            &[
                ". X . X O .", //
                "X X X O O O",
                "X X X O O O",
                ". X O . O .",
            ],
            0.5,
        )
    }

    #[test]
    fn test_background_solve_reuses_cache() {
        let mut game = contested();
        let solution = game.best_move(None).unwrap();
        game.start_best_move(None).unwrap();
        let result = game.poll_best_move().unwrap().unwrap();
        assert!(Arc::ptr_eq(&result.root, &solution.root));
        assert!(!game.is_solving());
    }

    #[test]
    fn test_repetition_query() {
        let game = contested();
        assert!(!game.is_repetition_imminent(Point::new(1, 2)));
    }

    #[test]
    fn test_repetition_imminent_before_ko_recapture() {
        let mut game = double_ko();
        game.place_stone(3, 3).unwrap(); // Black takes the lower ko
        game.place_stone(0, 2).unwrap(); // White takes the upper ko
        game.pass_turn().unwrap();
        game.place_stone(3, 2).unwrap(); // White retakes below

        // Retaking above would bring back the starting layout; the ko point
        // itself is illegal and never repeats.
        assert!(game.is_repetition_imminent(Point::new(0, 3)));
        assert!(!game.is_repetition_imminent(Point::new(3, 3)));

        let played = game.place_stone(0, 3).unwrap();
        assert_eq!(played.long_cycle, Some(LongCycle::NoResult));
        assert_eq!(game.board().prisoner_counts(), [2, 2]);
        assert!(!game.can_undo());
    }

    #[test]
    fn test_repetition_test_can_be_switched_off() {
        let mut game = double_ko();
        game.set_repetition_test(false);
        for (row, col) in [(3, 3), (0, 2)] {
            game.place_stone(row, col).unwrap();
        }
        game.pass_turn().unwrap();
        game.place_stone(3, 2).unwrap();
        assert!(!game.is_repetition_imminent(Point::new(0, 3)));
        let played = game.place_stone(0, 3).unwrap();
        assert_eq!(played.long_cycle, None);
        assert!(game.can_undo());
    }

    #[test]
    fn test_pass_with_fixed_color() {
        let mut game = GameModel::default();
        game.set_mode(Mode::Sandbox);
        game.set_alternation(Alternation::Only(Color::White)).unwrap();
        game.pass_turn().unwrap();
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.board().passes(), 1);
    }
}
