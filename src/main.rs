//! goban-solver: Go rules engine and exact endgame solver.
//!
//! ## Usage
//!
//! - `goban-solver` - Show a demo
//! - `goban-solver gtp` - Start a GTP session on stdin/stdout
//! - `goban-solver demo` - Solve a small endgame and print the best line
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use goban_solver::board::{format_vertex, Board, Move};
use goban_solver::config::{GameConfig, PassRule, SolverConfig};
use goban_solver::constants::{DEFAULT_KOMI, MAX_SEARCH_DEPTH, MAX_UNDECIDED};
use goban_solver::grid::{grid_from_rows, Color};
use goban_solver::gtp::GtpEngine;
use goban_solver::model::GameModel;

/// goban-solver: Go rules engine with an exact endgame solver
#[derive(Parser)]
#[command(name = "goban-solver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Points added to White's score
    #[arg(long, default_value_t = DEFAULT_KOMI, allow_negative_numbers = true)]
    komi: f32,

    /// Refuse to solve positions with more undecided points
    #[arg(long, default_value_t = MAX_UNDECIDED)]
    max_undecided: usize,

    /// Time budget for one solve, in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Deepest iteration of the search
    #[arg(long, default_value_t = MAX_SEARCH_DEPTH)]
    max_depth: u8,

    /// Let the search pass at every node, not only when blocked
    #[arg(long)]
    pass_always: bool,

    /// Do not stop play at long cycles
    #[arg(long)]
    no_repetition_test: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) engine for use with GUI applications
    Gtp,
    /// Solve a small endgame and print the result
    Demo,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut solver = SolverConfig::default()
            .with_max_undecided(self.max_undecided)
            .with_max_depth(self.max_depth);
        if self.pass_always {
            solver = solver.with_pass_rule(PassRule::Always);
        }
        if let Some(ms) = self.budget_ms {
            solver = solver.with_budget(Duration::from_millis(ms));
        }
        let config = GameConfig::default()
            .with_komi(self.komi)
            .context("invalid --komi")?
            .with_solver(solver)
            .with_repetition_test(!self.no_repetition_test);
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.game_config()?;

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_config(config);
            engine.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Demo) | None => run_demo(config)?,
    }
    Ok(())
}

fn run_demo(config: GameConfig) -> Result<()> {
    println!("goban-solver: exact endgame demo\n");

    let board = Board::from_grid(grid_from_rows(&[
        ". X . . O .",
        "X X . . O O",
        ". X X . O .",
    ]));
    let mut game = GameModel::from_board(config, board, Color::Black);
    println!("{}\n", game.board());

    let analysis = game.board().analysis();
    println!("Undecided points: {}", analysis.undecided().len());

    let solution = game.best_move(None).context("solving the demo position")?;
    println!(
        "{} to move: {} ({:?}, {} nodes, depth {})",
        solution.to_move,
        solution.root.outcome(),
        solution.status,
        solution.stats.nodes,
        solution.stats.depth,
    );

    let rows = game.board().rows();
    let mut line = Vec::new();
    while let Some(mv) = game.solution().and_then(|s| s.best_moves().next()) {
        line.push(format_vertex(mv, rows));
        let played = match mv {
            Move::Place(p) => game.place_stone(p.row, p.col)?,
            Move::Pass => game.pass_turn()?,
        };
        if let Some(score) = played.game_over {
            println!("Best line: {}", line.join(" "));
            println!("Result: {}", score.outcome());
            return Ok(());
        }
    }
    println!("Best line: {}", line.join(" "));
    println!("{}", game.board());
    println!("Score: {}", game.score()?);
    Ok(())
}
