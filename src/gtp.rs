//! Go Text Protocol (GTP) front end.
//!
//! A line-oriented GTP version 2 engine over [`GameModel`], so the rules
//! engine and the solver can be driven from a terminal or a GTP client.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`,
//!   `known_command <cmd>`, `quit`
//! - `boardsize <size> [<cols>]` - New empty board (rectangular with two sizes)
//! - `clear_board` - Empty the board, keeping its size
//! - `komi <value>`
//! - `play <color> <vertex>` - Play a move
//! - `genmove <color>` - Solve the position and play a best move
//! - `undo`, `redo`
//! - `final_score` - Score of the current board, e.g. `B+2.5`
//! - `showboard`
//!
//! Extensions:
//!
//! - `solve` - Value for the side to move and all best moves
//! - `reset_prisoners`
//! - `mode play|sandbox`
//! - `alternation alternate|black|white|erase|capture`
//! - `repetition <vertex>` - Whether the move would complete a long cycle
//! - `repetition_test [on|off]` - Switch long-cycle checks, or report them
//! - `territory` - Owner of every point
//!
//! ## Example
//!
//! ```
//! use goban_solver::gtp::GtpEngine;
//!
//! let mut engine = GtpEngine::new();
//! let mut output = Vec::new();
//! engine.run(&b"1 boardsize 5\n2 play black C3\n"[..], &mut output).unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "=1 \n\n=2 \n\n");
//! ```

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::board::{format_vertex, parse_vertex, Move};
use crate::config::GameConfig;
use crate::grid::Color;
use crate::model::{Alternation, GameModel, Mode};
use crate::solver::SolveStatus;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "alternation",
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "mode",
    "name",
    "play",
    "protocol_version",
    "quit",
    "redo",
    "repetition",
    "repetition_test",
    "reset_prisoners",
    "showboard",
    "solve",
    "territory",
    "undo",
    "version",
];

type Response = (bool, String);

fn failure(message: impl ToString) -> Response {
    (false, message.to_string())
}

fn success(message: impl ToString) -> Response {
    (true, message.to_string())
}

fn parse_color(arg: &str) -> Option<Color> {
    match arg.to_ascii_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

/// GTP engine state.
pub struct GtpEngine {
    game: GameModel,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GtpEngine {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self {
            game: GameModel::new(config),
        }
    }

    pub fn game(&self) -> &GameModel {
        &self.game
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (ok, message) = self.execute(&command, args);
            let prefix = if ok { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> Response {
        debug!(command, ?args, "gtp command");
        match command {
            "name" => success(env!("CARGO_PKG_NAME")),

            "version" => success(env!("CARGO_PKG_VERSION")),

            "protocol_version" => success("2"),

            "list_commands" => success(KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    success(known)
                }
                None => failure("missing argument"),
            },

            "quit" => success(""),

            "boardsize" => self.boardsize(args),

            "clear_board" => {
                let (rows, cols) = (self.game.board().rows(), self.game.board().cols());
                match self.game.new_board(rows, cols) {
                    Ok(_) => success(""),
                    Err(err) => failure(err),
                }
            }

            "komi" => match args.first().map(|a| a.parse::<f32>()) {
                Some(Ok(komi)) => match self.game.set_komi(komi) {
                    Ok(()) => success(""),
                    Err(err) => failure(err),
                },
                Some(Err(_)) => failure("invalid komi"),
                None => failure("missing argument"),
            },

            "play" => self.play(args),

            "genmove" => self.genmove(args),

            "undo" => match self.game.undo() {
                Ok(_) => success(""),
                Err(err) => failure(err),
            },

            "redo" => match self.game.redo() {
                Ok(_) => success(""),
                Err(err) => failure(err),
            },

            "final_score" => match self.game.score() {
                Ok(score) => success(score.outcome()),
                Err(err) => failure(err),
            },

            "showboard" => success(format!("\n{}", self.game.board())),

            "solve" => self.solve(),

            "reset_prisoners" => {
                self.game.reset_prisoners();
                success("")
            }

            "mode" => match args.first().map(|a| a.to_lowercase()).as_deref() {
                Some("play") => {
                    self.game.set_mode(Mode::Play);
                    success("")
                }
                Some("sandbox") => {
                    self.game.set_mode(Mode::Sandbox);
                    success("")
                }
                Some(_) => failure("mode must be play or sandbox"),
                None => success(self.game.mode()),
            },

            "alternation" => {
                let alternation = match args.first().map(|a| a.to_lowercase()).as_deref() {
                    Some("alternate") => Alternation::Alternate,
                    Some("erase") => Alternation::Erase { take_prisoner: false },
                    Some("capture") => Alternation::Erase { take_prisoner: true },
                    Some(other) => match parse_color(other) {
                        Some(color) => Alternation::Only(color),
                        None => return failure("unknown alternation"),
                    },
                    None => return failure("missing argument"),
                };
                match self.game.set_alternation(alternation) {
                    Ok(()) => success(""),
                    Err(err) => failure(err),
                }
            }

            "repetition" => {
                let board = self.game.board();
                match args.first().and_then(|a| parse_vertex(a, board.rows(), board.cols())) {
                    Some(Move::Place(point)) => success(self.game.is_repetition_imminent(point)),
                    Some(Move::Pass) => success(false),
                    None => failure("invalid vertex"),
                }
            }

            "repetition_test" => match args.first().map(|a| a.to_lowercase()).as_deref() {
                Some("on") => {
                    self.game.set_repetition_test(true);
                    success("")
                }
                Some("off") => {
                    self.game.set_repetition_test(false);
                    success("")
                }
                Some(_) => failure("repetition_test must be on or off"),
                None => success(if self.game.config().test_repetition { "on" } else { "off" }),
            },

            "territory" => success(self.territory()),

            _ => failure(format!("unknown command: {command}")),
        }
    }

    fn boardsize(&mut self, args: &[&str]) -> Response {
        let sizes: Result<Vec<usize>, _> = args.iter().map(|a| a.parse::<usize>()).collect();
        let (rows, cols) = match sizes.as_deref() {
            Ok([size]) => (*size, *size),
            Ok([rows, cols]) => (*rows, *cols),
            Ok(_) => return failure("expected one or two sizes"),
            Err(_) => return failure("invalid size"),
        };
        match self.game.new_board(rows, cols) {
            Ok(_) => success(""),
            Err(err) => failure(format!("unacceptable size: {err}")),
        }
    }

    fn play(&mut self, args: &[&str]) -> Response {
        let [color, vertex, ..] = args else {
            return failure("missing arguments");
        };
        let Some(color) = parse_color(color) else {
            return failure("invalid color");
        };
        let board = self.game.board();
        let Some(mv) = parse_vertex(vertex, board.rows(), board.cols()) else {
            return failure("invalid vertex");
        };
        if let Err(err) = self.select_color(color) {
            return failure(err);
        }

        let played = match mv {
            Move::Place(point) => self.game.place_stone(point.row, point.col),
            Move::Pass => self.game.pass_turn(),
        };
        match played {
            Ok(played) => {
                let mut notes = Vec::new();
                if let Some(cycle) = played.long_cycle {
                    notes.push(cycle.to_string());
                }
                if let Some(score) = played.game_over {
                    notes.push(score.outcome().to_string());
                }
                success(notes.join(" "))
            }
            Err(err) => failure(err),
        }
    }

    /// In Play mode the color must be the one to move; in Sandbox the next
    /// stone simply takes the requested color.
    fn select_color(&mut self, color: Color) -> Result<(), String> {
        match self.game.mode() {
            Mode::Play if self.game.to_move() != color => {
                Err(format!("it is {}'s turn", self.game.to_move()))
            }
            Mode::Play => Ok(()),
            Mode::Sandbox => self
                .game
                .set_alternation(Alternation::Only(color))
                .map_err(|err| err.to_string()),
        }
    }

    fn genmove(&mut self, args: &[&str]) -> Response {
        let Some(color) = args.first().and_then(|a| parse_color(a)) else {
            return failure("invalid color");
        };
        if let Err(err) = self.select_color(color) {
            return failure(err);
        }
        let solution = match self.game.best_move(None) {
            Ok(solution) => solution,
            Err(err) => return failure(err),
        };
        if let SolveStatus::Partial { depth, .. } = solution.status {
            return failure(format!("too complex: search incomplete at depth {depth}"));
        }

        let mv = solution.best_moves().next().unwrap_or(Move::Pass);
        let played = match mv {
            Move::Place(point) => self.game.place_stone(point.row, point.col),
            Move::Pass => self.game.pass_turn(),
        };
        match played {
            Ok(played) => success(format_vertex(mv, played.board.rows())),
            Err(err) => failure(err),
        }
    }

    fn solve(&mut self) -> Response {
        let solution = match self.game.best_move(None) {
            Ok(solution) => solution,
            Err(err) => return failure(err),
        };
        let rows = self.game.board().rows();
        let moves: Vec<String> = solution
            .best_moves()
            .map(|mv| format_vertex(mv, rows))
            .collect();
        let status = match solution.status {
            SolveStatus::Exact => "exact".to_string(),
            SolveStatus::Partial { depth, .. } => format!("partial depth {depth}"),
        };
        success(format!(
            "{} {} {status} {}",
            solution.to_move,
            solution.root.outcome(),
            moves.join(" ")
        ))
    }

    fn territory(&self) -> String {
        let board = self.game.board();
        let analysis = board.analysis();
        let mut out = String::new();
        for row in 0..board.rows() {
            out.push('\n');
            for col in 0..board.cols() {
                let idx = row * board.cols() + col;
                let ch = match (board.grid().stone(idx), analysis.owner(idx)) {
                    (_, None) => '?',
                    (None, Some(Color::Black)) => 'b',
                    (None, Some(Color::White)) => 'w',
                    (Some(_), Some(Color::Black)) => 'X',
                    (Some(_), Some(Color::White)) => 'O',
                };
                out.push(ch);
            }
        }
        out
    }
}
