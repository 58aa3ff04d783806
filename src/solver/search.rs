//! Negamax search with alpha-beta pruning and iterative deepening.
//!
//! Each iteration searches the root with every move's exact value, so the
//! full set of best moves is known. Values are kept from the side to move's
//! point of view in fixed-point units. A node's value is *complete* when no
//! line below it was cut by the depth horizon; the first complete root ends
//! the deepening.
//!
//! Long cycles make values depend on the boards above a node. A result whose
//! lines closed a cycle above the node is never stored, and a stored result
//! is only reused where no board above could be recreated below it (see
//! [`super::tt`]).

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::board::{Board, Move};
use crate::config::PassRule;
use crate::constants::{CLOCK_CHECK_PERIOD, CYCLE_WIN, INF, LONG_CYCLE_MIN, POINT};
use crate::error::ComplexityError;
use crate::grid::Color;
use crate::repetition::LongCycle;
use crate::scoring::{self, Analysis, LifeMode};

use super::ordering::{self, Candidate, History, Killers};
use super::symmetry::{canonicalize, Canonical, Symmetry};
use super::tt::{EntryType, Signature, TTEntry, TranspositionTable};
use super::zobrist::Zobrist;
use super::{SearchLimit, SearchStats, SolveNode, SolveRequest, SolveStatus, Solution};

/// No long cycle was found below a node.
const NO_CYCLE: usize = usize::MAX;

/// A position on the current line, for long-cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathEntry {
    layout: u64,
    prisoners: [u32; 2],
    stones: usize,
}

impl PathEntry {
    fn new(zobrist: &Zobrist, board: &Board) -> Self {
        let grid = board.grid();
        Self {
            layout: zobrist.layout(grid),
            prisoners: board.prisoner_counts(),
            stones: grid.count(Color::Black) + grid.count(Color::White),
        }
    }
}

/// Value of a searched node.
#[derive(Debug, Clone, Copy)]
struct Eval {
    value: i32,
    complete: bool,
    /// Smallest path index a detected cycle reached back to.
    floor: usize,
    /// Fewest stones on a board visited below the node, the node included.
    min_stones: usize,
}

/// A node searched with exact values for all of its best moves.
#[derive(Debug, Clone)]
struct Expansion {
    value: i32,
    complete: bool,
    floor: usize,
    min_stones: usize,
    best: Vec<Candidate>,
}

impl Expansion {
    fn leaf(value: i32, complete: bool, floor: usize, min_stones: usize) -> Self {
        Self {
            value,
            complete,
            floor,
            min_stones,
            best: Vec::new(),
        }
    }
}

struct Searcher<'a> {
    request: &'a SolveRequest,
    cancel: &'a AtomicBool,
    deadline: Option<Instant>,
    stopped: bool,
    komi_units: i32,
    mode: LifeMode,
    seed: Option<[BTreeSet<usize>; 2]>,
    zobrist: Zobrist,
    symmetries: Vec<Symmetry>,
    tt: TranspositionTable,
    killers: Killers,
    history: History,
    path: Vec<PathEntry>,
    memo: HashMap<(Signature, u8), (Arc<SolveNode>, usize)>,
    stats: SearchStats,
}

impl<'a> Searcher<'a> {
    fn new(request: &'a SolveRequest, cancel: &'a AtomicBool, started: Instant) -> Self {
        let board = &request.board;
        let config = &request.config;
        let points = board.grid().len();
        let root = board.analysis();

        let (mode, seed) = if config.fast_path && root.is_bounded() {
            let seed = Color::ALL.map(|c| root.alive(c).clone());
            (LifeMode::Unconditional, Some(seed))
        } else {
            (LifeMode::Extended, None)
        };

        let zobrist = Zobrist::new(points);
        let mut path: Vec<PathEntry> = request
            .history
            .iter()
            .map(|b| PathEntry::new(&zobrist, b))
            .collect();
        let root_entry = PathEntry::new(&zobrist, board);
        if path.last() != Some(&root_entry) {
            path.push(root_entry);
        }

        let symmetries = if points <= config.symmetry_max_points {
            Symmetry::of_board(board.rows(), board.cols())
        } else {
            vec![Symmetry::Identity]
        };

        Self {
            request,
            cancel,
            deadline: started.checked_add(config.budget),
            stopped: false,
            komi_units: (request.komi * POINT as f32).round() as i32,
            mode,
            seed,
            zobrist,
            symmetries,
            tt: TranspositionTable::new(),
            killers: Killers::default(),
            history: History::new(points),
            path,
            memo: HashMap::new(),
            stats: SearchStats {
                life_mode: Some(mode),
                ..SearchStats::default()
            },
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Count a node and check the clock every few nodes.
    fn tick(&mut self) -> bool {
        self.stats.nodes += 1;
        if !self.stopped && self.stats.nodes % CLOCK_CHECK_PERIOD == 0 {
            let late = self.deadline.is_some_and(|d| Instant::now() >= d);
            self.stopped = late || self.cancelled();
        }
        self.stopped
    }

    fn analyze(&self, board: &Board) -> Analysis {
        scoring::analyze_seeded(board, self.mode, self.seed.as_ref())
    }

    fn canonical(&self, board: &Board, color: Color, ply: usize) -> (Canonical, Signature) {
        let symmetries: &[Symmetry] = if ply <= usize::from(self.request.config.symmetry_max_ply) {
            &self.symmetries
        } else {
            &[Symmetry::Identity]
        };
        let canonical = canonicalize(&self.zobrist, board, color, symmetries);
        let signature = Signature::new(board, color, canonical.symmetry);
        (canonical, signature)
    }

    fn push(&mut self, board: &Board) {
        let entry = PathEntry::new(&self.zobrist, board);
        self.path.push(entry);
    }

    /// The long cycle closed by the last position of the path, with the
    /// index of the earlier occurrence.
    fn path_cycle(&self) -> Option<(usize, LongCycle)> {
        let (current, _) = self.path.split_last()?;
        let end = self.path.len().saturating_sub(LONG_CYCLE_MIN);
        let idx = self.path[..end]
            .iter()
            .rposition(|e| e.layout == current.layout)?;
        let previous = self.path[idx];
        let gain = |c: usize| i64::from(current.prisoners[c]) - i64::from(previous.prisoners[c]);
        Some((idx, LongCycle::from_gains(gain(0), gain(1))))
    }

    /// Most stones on a board above the last position of the path. Boards
    /// with its own layout are left out: a line recreating that layout meets
    /// the position itself first.
    fn ancestor_stones(&self) -> Option<usize> {
        let (current, above) = self.path.split_last()?;
        above
            .iter()
            .filter(|e| e.layout != current.layout)
            .map(|e| e.stones)
            .max()
    }

    /// Whether a result whose search saw no board with fewer than
    /// `min_stones` stones holds on the current path.
    fn reusable(&self, min_stones: usize) -> bool {
        self.ancestor_stones().is_none_or(|stones| stones < min_stones)
    }

    fn terminal_value(&self, board: &Board, analysis: &Analysis, color: Color) -> i32 {
        color.sign() * (analysis.balance(board.prisoner_counts()) - self.komi_units)
    }

    fn static_value(&self, board: &Board, analysis: &Analysis, color: Color) -> i32 {
        let units = analysis.balance(board.prisoner_counts()) - self.komi_units
            + ordering::heuristic(board, analysis);
        color.sign() * units
    }

    fn candidates(&self, board: &Board, color: Color, analysis: &Analysis) -> Vec<Candidate> {
        let grid = board.grid();
        let mut list: Vec<Candidate> = analysis
            .undecided()
            .iter()
            .filter_map(|&idx| {
                let next = board.play_index(color, idx, false).ok()?;
                let captured = next.prisoners(color) - board.prisoners(color);
                Some(Candidate {
                    mv: Move::Place(grid.point(idx)),
                    board: next,
                    captured,
                })
            })
            .collect();
        if list.is_empty() || self.request.config.pass_rule == PassRule::Always {
            list.push(Candidate {
                mv: Move::Pass,
                board: board.pass(),
                captured: 0,
            });
        }
        list
    }

    /// Store an entry whose best move is given in the board's orientation.
    fn store(&mut self, canonical: Canonical, mut entry: TTEntry) {
        let (rows, cols) = (self.request.board.rows(), self.request.board.cols());
        entry.best = entry.best.map(|mv| canonical.symmetry.map_move(mv, rows, cols));
        self.tt.store(canonical.key, entry);
    }

    /// Negamax with alpha-beta pruning. Returns None once the search has
    /// been stopped.
    fn negamax(&mut self, board: &Board, color: Color, depth: u8, ply: usize, mut alpha: i32, beta: i32) -> Option<Eval> {
        if self.tick() {
            return None;
        }
        let here = self.path.len() - 1;
        let stones = self.path[here].stones;
        if ply > 0 {
            if let Some((idx, cycle)) = self.path_cycle() {
                return Some(Eval {
                    value: cycle_value(cycle, color),
                    complete: true,
                    floor: idx,
                    min_stones: stones,
                });
            }
        }

        let (canonical, signature) = self.canonical(board, color, ply);
        let ancestors = self.ancestor_stones();
        let probe = self.tt.probe(canonical.key, &signature, depth, alpha, beta, ancestors);
        if let Some((value, complete)) = probe.value {
            return Some(Eval {
                value,
                complete,
                floor: NO_CYCLE,
                min_stones: probe.min_stones,
            });
        }
        let (rows, cols) = (board.rows(), board.cols());
        let tt_move = probe
            .best
            .map(|mv| canonical.symmetry.inverse().map_move(mv, rows, cols));

        let analysis = self.analyze(board);
        if board.is_finished() || analysis.is_settled() {
            let value = self.terminal_value(board, &analysis, color);
            let entry = TTEntry {
                signature,
                value,
                entry_type: EntryType::Exact,
                depth,
                complete: true,
                min_stones: stones,
                best: None,
            };
            self.store(canonical, entry);
            return Some(Eval {
                value,
                complete: true,
                floor: NO_CYCLE,
                min_stones: stones,
            });
        }
        if depth == 0 {
            return Some(Eval {
                value: self.static_value(board, &analysis, color),
                complete: false,
                floor: NO_CYCLE,
                min_stones: stones,
            });
        }

        let mut candidates = self.candidates(board, color, &analysis);
        ordering::order(&mut candidates, color, ply, tt_move, &self.killers, &self.history);

        let alpha_orig = alpha;
        let mut best = -INF;
        let mut best_move = None;
        let mut complete = true;
        let mut floor = NO_CYCLE;
        let mut min_stones = stones;
        for (i, candidate) in candidates.iter().enumerate() {
            self.push(&candidate.board);
            let child = self.negamax(&candidate.board, color.opponent(), depth - 1, ply + 1, -beta, -alpha);
            self.path.pop();
            let child = child?;

            let value = -child.value;
            complete &= child.complete;
            floor = floor.min(child.floor);
            min_stones = min_stones.min(child.min_stones);
            if value > best {
                best = value;
                best_move = Some(candidate.mv);
            }
            alpha = alpha.max(value);
            if alpha >= beta {
                self.stats.cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                if candidate.mv != Move::Pass {
                    self.killers.record(ply, candidate.mv);
                }
                self.history.record(color, candidate.mv, cols, depth);
                break;
            }
        }

        if floor >= here {
            let entry_type = if best <= alpha_orig {
                EntryType::UpperBound
            } else if best >= beta {
                EntryType::LowerBound
            } else {
                EntryType::Exact
            };
            let entry = TTEntry {
                signature,
                value: best,
                entry_type,
                depth,
                complete,
                min_stones,
                best: best_move,
            };
            self.store(canonical, entry);
        }
        Some(Eval {
            value: best,
            complete,
            floor,
            min_stones,
        })
    }

    /// Search a node so that every move reaching the best value is known
    /// exactly: each move is searched with a window just below the best value
    /// found so far.
    fn expand(&mut self, board: &Board, color: Color, depth: u8, ply: usize) -> Option<Expansion> {
        if self.tick() {
            return None;
        }
        let here = self.path.len() - 1;
        let stones = self.path[here].stones;
        if ply > 0 {
            if let Some((idx, cycle)) = self.path_cycle() {
                return Some(Expansion::leaf(cycle_value(cycle, color), true, idx, stones));
            }
        }

        let analysis = self.analyze(board);
        if board.is_finished() || analysis.is_settled() {
            let value = self.terminal_value(board, &analysis, color);
            return Some(Expansion::leaf(value, true, NO_CYCLE, stones));
        }
        if depth == 0 {
            let value = self.static_value(board, &analysis, color);
            return Some(Expansion::leaf(value, false, NO_CYCLE, stones));
        }

        let (canonical, signature) = self.canonical(board, color, ply);
        let (rows, cols) = (board.rows(), board.cols());
        let tt_move = self
            .tt
            .best_move(canonical.key, &signature)
            .map(|mv| canonical.symmetry.inverse().map_move(mv, rows, cols));
        let mut candidates = self.candidates(board, color, &analysis);
        ordering::order(&mut candidates, color, ply, tt_move, &self.killers, &self.history);

        let mut best = -INF;
        let mut chosen: Vec<Candidate> = Vec::new();
        let mut complete = true;
        let mut floor = NO_CYCLE;
        let mut min_stones = stones;
        for candidate in candidates {
            let alpha = if best == -INF { -INF } else { best - 1 };
            self.push(&candidate.board);
            let child = self.negamax(&candidate.board, color.opponent(), depth - 1, ply + 1, -INF, -alpha);
            self.path.pop();
            let child = child?;

            let value = -child.value;
            complete &= child.complete;
            floor = floor.min(child.floor);
            min_stones = min_stones.min(child.min_stones);
            if value > best {
                best = value;
                chosen.clear();
                chosen.push(candidate);
            } else if value == best {
                chosen.push(candidate);
            }
        }

        if floor >= here {
            let entry = TTEntry {
                signature,
                value: best,
                entry_type: EntryType::Exact,
                depth,
                complete,
                min_stones,
                best: chosen.first().map(|c| c.mv),
            };
            self.store(canonical, entry);
        }
        Some(Expansion {
            value: best,
            complete,
            floor,
            min_stones,
            best: chosen,
        })
    }

    /// Build the tree of best lines below a node. Positions reached by
    /// different move orders share one subtree when no earlier board of the
    /// new line can recur inside it.
    fn extract(&mut self, board: &Board, color: Color, depth: u8, ply: usize) -> Option<(Arc<SolveNode>, usize)> {
        let here = self.path.len() - 1;
        let memo_key = (Signature::new(board, color, Symmetry::Identity), depth);
        let closes_cycle = ply > 0 && self.path_cycle().is_some();
        if let Some((node, min_stones)) = self.memo.get(&memo_key) {
            if !closes_cycle && self.reusable(*min_stones) {
                return Some((Arc::clone(node), *min_stones));
            }
        }
        let expansion = self.expand(board, color, depth, ply)?;

        let mut best = Vec::with_capacity(expansion.best.len());
        let mut min_stones = expansion.min_stones;
        for candidate in &expansion.best {
            let child_depth = depth.saturating_sub(1);
            self.push(&candidate.board);
            let child = self.extract(&candidate.board, color.opponent(), child_depth, ply + 1);
            self.path.pop();
            let child = match child {
                Some((node, stones)) => {
                    min_stones = min_stones.min(stones);
                    node
                }
                None => Arc::new(SolveNode::leaf(-expansion.value, child_depth, false)),
            };
            best.push((candidate.mv, child));
        }

        let node = Arc::new(SolveNode {
            value: expansion.value,
            depth,
            complete: expansion.complete,
            best,
        });
        if expansion.floor >= here {
            self.memo.insert(memo_key, (Arc::clone(&node), min_stones));
        }
        Some((node, min_stones))
    }
}

fn cycle_value(cycle: LongCycle, color: Color) -> i32 {
    match cycle.winner() {
        Some(winner) if winner == color => CYCLE_WIN,
        Some(_) => -CYCLE_WIN,
        None => 0,
    }
}

/// The root of a partial result: the best moves of the last iteration with
/// their values, not expanded further.
fn shallow(expansion: &Expansion, depth: u8) -> Arc<SolveNode> {
    let best = expansion
        .best
        .iter()
        .map(|c| {
            let leaf = SolveNode::leaf(-expansion.value, depth.saturating_sub(1), false);
            (c.mv, Arc::new(leaf))
        })
        .collect();
    Arc::new(SolveNode {
        value: expansion.value,
        depth,
        complete: expansion.complete,
        best,
    })
}

/// Solve a position.
///
/// # Errors
/// - [`ComplexityError::TooManyUndecided`] if more points are contested than
///   the configuration allows
/// - [`ComplexityError::BudgetExhausted`] if not even the first iteration
///   finished within the budget
/// - [`ComplexityError::Cancelled`] if `cancel` was raised
pub fn solve(request: &SolveRequest, cancel: &AtomicBool) -> Result<Solution, ComplexityError> {
    let started = Instant::now();
    let config = &request.config;
    let board = &request.board;
    let color = request.to_move;

    let undecided = board.analysis().undecided().len();
    if undecided > config.max_undecided {
        warn!(undecided, limit = config.max_undecided, "position too complex to solve");
        return Err(ComplexityError::TooManyUndecided {
            count: undecided,
            limit: config.max_undecided,
        });
    }

    let mut searcher = Searcher::new(request, cancel, started);
    debug!(undecided, mode = ?searcher.mode, "solve started");

    let mut last: Option<(u8, Expansion)> = None;
    for depth in 1..=config.max_depth.max(1) {
        if searcher.cancelled() {
            break;
        }
        let Some(expansion) = searcher.expand(board, color, depth, 0) else {
            break;
        };
        trace!(
            depth,
            value = expansion.value,
            complete = expansion.complete,
            nodes = searcher.stats.nodes,
            "iteration finished"
        );
        searcher.stats.depth = depth;
        let done = expansion.complete;
        last = Some((depth, expansion));
        if done {
            break;
        }
    }

    if searcher.cancelled() {
        debug!("solve cancelled");
        return Err(ComplexityError::Cancelled);
    }
    let Some((depth, expansion)) = last else {
        warn!(budget = ?config.budget, "no search iteration finished");
        return Err(ComplexityError::BudgetExhausted {
            budget: config.budget,
        });
    };

    let (status, root) = if expansion.complete {
        // The best lines are re-derived with the table's help; only
        // cancellation may interrupt them.
        searcher.stopped = false;
        searcher.deadline = None;
        let root = searcher
            .extract(board, color, depth, 0)
            .map(|(node, _)| node)
            .unwrap_or_else(|| shallow(&expansion, depth));
        (SolveStatus::Exact, root)
    } else {
        let limit = if searcher.stopped {
            SearchLimit::Budget
        } else {
            SearchLimit::Depth
        };
        (SolveStatus::Partial { depth, limit }, shallow(&expansion, depth))
    };
    if searcher.cancelled() {
        return Err(ComplexityError::Cancelled);
    }

    let (probes, hits) = searcher.tt.counters();
    let mut stats = searcher.stats;
    stats.tt_probes = probes;
    stats.tt_hits = hits;
    stats.tt_entries = searcher.tt.len();
    stats.elapsed = started.elapsed();
    info!(
        value = root.value,
        ?status,
        depth = stats.depth,
        nodes = stats.nodes,
        tt_hit_rate = stats.tt_hit_rate(),
        cutoffs = stats.cutoffs,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "solve finished"
    );

    Ok(Solution {
        to_move: color,
        root,
        status,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::grid::{grid_from_rows, Point};
    use std::time::Duration;

    fn request(rows: &[&str], to_move: Color, komi: f32) -> SolveRequest {
        let board = Board::from_grid(grid_from_rows(rows));
        SolveRequest::new(board, to_move, komi, SolverConfig::default())
    }

    fn run(request: &SolveRequest) -> Result<Solution, ComplexityError> {
        solve(request, &AtomicBool::new(false))
    }

    #[test]
    fn test_settled_position_is_a_leaf() {
        let req = request(
            &[
                ". X X O .", //
                "X X O O O",
                ". X O . .",
            ],
            Color::Black,
            0.5,
        );
        let solution = run(&req).unwrap();
        assert_eq!(solution.status, SolveStatus::Exact);
        assert!(solution.root.best.is_empty());
        // Two points against three and komi.
        assert_eq!(solution.root.value, -48);
    }

    #[test]
    fn test_too_many_undecided_points() {
        let mut req = request(&[". . . .", ". . . ."], Color::Black, 0.5);
        req.config = req.config.with_max_undecided(3);
        assert_eq!(
            run(&req).unwrap_err(),
            ComplexityError::TooManyUndecided { count: 8, limit: 3 }
        );
    }

    #[test]
    fn test_zero_budget_is_never_exact() {
        let mut req = request(&[". . .", ". . .", ". . ."], Color::Black, 0.5);
        req.config = req
            .config
            .with_max_undecided(9)
            .with_budget(Duration::ZERO);
        // The clock is read every few hundred nodes, so either nothing
        // finished or a shallow iteration did.
        match run(&req) {
            Err(err) => assert!(matches!(err, ComplexityError::BudgetExhausted { .. })),
            Ok(solution) => assert!(matches!(
                solution.status,
                SolveStatus::Partial { limit: SearchLimit::Budget, .. }
            )),
        }
    }

    const NEUTRAL: &[&str] = &[
        ". X . O .", //
        "X X . O O",
        ". X X O .",
    ];

    #[test]
    fn test_neutral_points_are_worth_nothing() {
        // Two neutral points between two living groups: every move keeps
        // the balance.
        let req = request(NEUTRAL, Color::White, 0.0);
        let solution = run(&req).unwrap();
        assert_eq!(solution.status, SolveStatus::Exact);
        assert_eq!(solution.root.value, 0);
        let best: Vec<Move> = solution.best_moves().collect();
        assert_eq!(best.len(), 2);
        assert!(best.contains(&Move::Place(Point::new(0, 2))));
        assert!(best.contains(&Move::Place(Point::new(1, 2))));
    }

    #[test]
    fn test_passing_at_every_node() {
        let mut req = request(NEUTRAL, Color::White, 0.0);
        req.config = req.config.with_pass_rule(PassRule::Always);
        let solution = run(&req).unwrap();
        assert_eq!(solution.root.value, 0);
        let best: Vec<Move> = solution.best_moves().collect();
        assert_eq!(best.len(), 3);
        assert!(best.contains(&Move::Pass));
    }

    #[test]
    fn test_pass_only_when_nothing_is_playable() {
        let req = request(NEUTRAL, Color::Black, 0.0);
        let cancel = AtomicBool::new(false);
        let searcher = Searcher::new(&req, &cancel, Instant::now());
        let analysis = searcher.analyze(&req.board);
        let moves: Vec<Move> = searcher
            .candidates(&req.board, Color::Black, &analysis)
            .iter()
            .map(|c| c.mv)
            .collect();
        assert_eq!(moves.len(), 2);
        assert!(!moves.contains(&Move::Pass));

        // Black's ko retake is its only contested point, so it passes.
        let ko = Board::from_grid(grid_from_rows(&[
            ". X . X O .", //
            "X X X O O O",
            ". X X O O .",
        ]));
        let taken = ko.play(Color::White, Point::new(0, 2), false).unwrap();
        assert_eq!(taken.ko(), Some(Point::new(0, 3)));
        let req = SolveRequest::new(taken.clone(), Color::Black, 0.0, SolverConfig::default());
        let searcher = Searcher::new(&req, &cancel, Instant::now());
        let analysis = searcher.analyze(&taken);
        let moves: Vec<Move> = searcher
            .candidates(&taken, Color::Black, &analysis)
            .iter()
            .map(|c| c.mv)
            .collect();
        assert_eq!(moves, vec![Move::Pass]);
    }

    #[test]
    fn test_earlier_boards_limit_reuse() {
        let root = Board::from_grid(grid_from_rows(NEUTRAL));
        let stones = root.grid().count(Color::Black) + root.grid().count(Color::White);
        let fuller = root.play(Color::Black, Point::new(1, 2), false).unwrap();
        let cancel = AtomicBool::new(false);

        // A board above with one stone more could be recreated by lines
        // that never drop below that many stones.
        let req = request(NEUTRAL, Color::White, 0.0).with_history(vec![fuller, root.clone()]);
        let searcher = Searcher::new(&req, &cancel, Instant::now());
        assert_eq!(searcher.path.len(), 2);
        assert_eq!(searcher.ancestor_stones(), Some(stones + 1));
        assert!(!searcher.reusable(stones + 1));
        assert!(searcher.reusable(stones + 2));

        // A pass keeps the layout; such a board never limits reuse.
        let req = request(NEUTRAL, Color::White, 0.0).with_history(vec![root.pass(), root.clone()]);
        let searcher = Searcher::new(&req, &cancel, Instant::now());
        assert_eq!(searcher.ancestor_stones(), None);
        assert!(searcher.reusable(0));
    }

    #[test]
    fn test_best_lines_reach_terminal_positions() {
        let req = request(NEUTRAL, Color::Black, 0.5);
        let solution = run(&req).unwrap();
        let mut node = Arc::clone(&solution.root);
        let mut plies = 0;
        while let Some(child) = node.best.first().map(|(_, c)| Arc::clone(c)) {
            assert_eq!(child.value, -node.value);
            node = child;
            plies += 1;
        }
        assert!(plies >= 2);
        assert!(node.complete);
    }

    #[test]
    fn test_cycle_values() {
        assert_eq!(cycle_value(LongCycle::Win(Color::White), Color::White), CYCLE_WIN);
        assert_eq!(cycle_value(LongCycle::Win(Color::White), Color::Black), -CYCLE_WIN);
        assert_eq!(cycle_value(LongCycle::NoResult, Color::Black), 0);
    }
}
