//! Life, territory and scores.
//!
//! Life is decided by Benson's algorithm, optionally refined by one move:
//! a chain that is not unconditionally alive still counts as alive when at
//! least two different empty points would each make it unconditionally alive
//! if its owner played there. The opponent cannot prevent both. This is an
//! approximation; it does not recognise seki.
//!
//! Territory is a maximal region of empty points and dead opponent stones
//! whose border consists only of the colour's live stones (at least one).

use std::collections::BTreeSet;
use std::fmt;

use crate::board::Board;
use crate::constants::POINT;
use crate::grid::{Color, GroupKind, Grid};

/// Life rule used by an analysis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifeMode {
    /// Benson's algorithm only.
    Unconditional,
    /// Benson's algorithm plus the one-move miai refinement.
    Extended,
}

/// Classification of every intersection of a board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    mode: LifeMode,
    owner: Vec<Option<Color>>,
    unconditional: [BTreeSet<usize>; 2],
    alive: [BTreeSet<usize>; 2],
    territory: [BTreeSet<usize>; 2],
    /// Opponent stones lying in each colour's territory.
    dead: [u32; 2],
    undecided: Vec<usize>,
    bounded: bool,
}

impl Analysis {
    #[inline]
    pub fn mode(&self) -> LifeMode {
        self.mode
    }

    /// Owner of a point: a live stone's colour, the territory's colour, or
    /// None when the point is still contested.
    #[inline]
    pub fn owner(&self, idx: usize) -> Option<Color> {
        self.owner[idx]
    }

    pub fn owners(&self) -> &[Option<Color>] {
        &self.owner
    }

    /// Stones of `color` that survive any sequence of opponent moves.
    pub fn unconditionally_alive(&self, color: Color) -> &BTreeSet<usize> {
        &self.unconditional[color.index()]
    }

    /// Stones of `color` counted as alive under this analysis' life rule.
    pub fn alive(&self, color: Color) -> &BTreeSet<usize> {
        &self.alive[color.index()]
    }

    pub fn territory(&self, color: Color) -> &BTreeSet<usize> {
        &self.territory[color.index()]
    }

    /// Opponent stones captured as dead inside `color`'s territory.
    #[inline]
    pub fn dead_stones(&self, color: Color) -> u32 {
        self.dead[color.index()]
    }

    /// Empty points belonging to neither territory. These are the candidate
    /// moves of the solver.
    pub fn undecided(&self) -> &[usize] {
        &self.undecided
    }

    /// Whether nothing remains to be played for.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.undecided.is_empty()
    }

    /// Whether every stone bordering the contested area is unconditionally
    /// alive, so no single-move threat against the border can change the
    /// outcome.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.bounded
    }

    /// Territory, dead stones and prisoners of Black minus White's, in
    /// fixed-point units, without komi.
    pub fn balance(&self, prisoners: [u32; 2]) -> i32 {
        let total = |c: usize| {
            self.territory[c].len() as i32 + self.dead[c] as i32 + prisoners[c] as i32
        };
        (total(0) - total(1)) * POINT
    }
}

/// Analyze a board under the given life rule.
pub fn analyze(board: &Board, mode: LifeMode) -> Analysis {
    analyze_seeded(board, mode, None)
}

/// Like [`analyze`], additionally counting the stones of `seed` as alive
/// while they are still on the board. The solver seeds the search with the
/// root's settled chains when it only recomputes Benson life.
pub fn analyze_seeded(board: &Board, mode: LifeMode, seed: Option<&[BTreeSet<usize>; 2]>) -> Analysis {
    let grid = board.grid();
    let unconditional = Color::ALL.map(|c| grid.unconditional_life(c).stones);
    let mut alive = match mode {
        LifeMode::Unconditional => unconditional.clone(),
        LifeMode::Extended => Color::ALL.map(|c| extended_life(grid, c, &unconditional[c.index()])),
    };
    if let Some(seed) = seed {
        for color in Color::ALL {
            let present = seed[color.index()]
                .iter()
                .copied()
                .filter(|&idx| grid.stone(idx) == Some(color));
            alive[color.index()].extend(present);
        }
    }

    let mut territory: [BTreeSet<usize>; 2] = Default::default();
    let mut dead = [0u32; 2];
    for color in Color::ALL {
        let (points, captured) = territory_of(grid, color, &alive);
        territory[color.index()] = points;
        dead[color.index()] = captured;
    }

    let owner: Vec<Option<Color>> = (0..grid.len())
        .map(|idx| {
            Color::ALL.into_iter().find(|c| {
                territory[c.index()].contains(&idx) || alive[c.index()].contains(&idx)
            })
        })
        .collect();
    let undecided: Vec<usize> = grid
        .empty_points()
        .filter(|&idx| owner[idx].is_none())
        .collect();

    // Owned neighbours of contested points are live stones; the contested
    // area is bounded when all of them are unconditionally alive.
    let bounded = (0..grid.len()).filter(|&idx| owner[idx].is_none()).all(|idx| {
        grid.neighbors(idx).iter().all(|&n| match (owner[n], grid.stone(n)) {
            (None, _) => true,
            (Some(c), Some(s)) if c == s => unconditional[c.index()].contains(&n),
            _ => true,
        })
    });

    Analysis {
        mode,
        owner,
        unconditional,
        alive,
        territory,
        dead,
        undecided,
        bounded,
    }
}

/// Stones of `color` alive under the one-move refinement.
fn extended_life(grid: &Grid, color: Color, base: &BTreeSet<usize>) -> BTreeSet<usize> {
    let pending: Vec<(usize, &BTreeSet<usize>)> = grid
        .groups()
        .filter(|(_, g)| g.kind == GroupKind::Stones(color))
        .filter_map(|(_, g)| g.anchor().filter(|a| !base.contains(a)).map(|a| (a, &g.members)))
        .collect();
    let mut alive = base.clone();
    if pending.is_empty() {
        return alive;
    }

    // One Benson pass per candidate point covers every pending chain.
    let mut threats = vec![0u8; pending.len()];
    let empties: Vec<usize> = grid.empty_points().collect();
    for p in empties {
        let mut next = grid.clone();
        next.place(p, color);
        if next.group_at(p).is_none_or(|g| g.liberties.is_empty()) {
            continue;
        }
        let life = next.unconditional_life(color);
        for (count, (anchor, _)) in threats.iter_mut().zip(&pending) {
            if life.is_alive(*anchor) {
                *count = count.saturating_add(1);
            }
        }
        if threats.iter().all(|&t| t >= 2) {
            break;
        }
    }

    for (count, (_, members)) in threats.iter().zip(&pending) {
        if *count >= 2 {
            alive.extend(members.iter().copied());
        }
    }
    alive
}

/// Territory points of `color` and the opponent stones lying in them.
fn territory_of(grid: &Grid, color: Color, alive: &[BTreeSet<usize>; 2]) -> (BTreeSet<usize>, u32) {
    let own = &alive[color.index()];
    let foe = &alive[color.opponent().index()];
    let inside = |idx: usize| match grid.stone(idx) {
        None => true,
        Some(c) => c != color && !foe.contains(&idx),
    };

    let mut seen = vec![false; grid.len()];
    let mut points = BTreeSet::new();
    let mut dead = 0;
    for start in 0..grid.len() {
        if seen[start] || !inside(start) {
            continue;
        }
        let mut region = Vec::new();
        let mut stack = vec![start];
        seen[start] = true;
        let mut enclosed = true;
        let mut bordered = false;
        while let Some(idx) = stack.pop() {
            region.push(idx);
            for &n in grid.neighbors(idx) {
                if inside(n) {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                } else {
                    bordered = true;
                    enclosed &= own.contains(&n);
                }
            }
        }
        if enclosed && bordered {
            dead += region.iter().filter(|&&idx| grid.stone(idx).is_some()).count() as u32;
            points.extend(region);
        }
    }
    (points, dead)
}

/// Game result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    Win { winner: Color, margin: f32 },
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win { winner: Color::Black, margin } => write!(f, "B+{margin}"),
            Outcome::Win { winner: Color::White, margin } => write!(f, "W+{margin}"),
            Outcome::Tie => write!(f, "0"),
        }
    }
}

/// Final score of a board.
#[derive(Clone, Debug, PartialEq)]
pub struct Score {
    /// Territory owner per point, row-major.
    pub owner: Vec<Option<Color>>,
    pub territory: [u32; 2],
    pub dead: [u32; 2],
    pub prisoners: [u32; 2],
    pub komi: f32,
    pub black: f32,
    pub white: f32,
    /// Empty points still contested.
    pub undecided: usize,
}

impl Score {
    pub fn new(board: &Board, analysis: &Analysis, komi: f32) -> Self {
        let territory = Color::ALL.map(|c| analysis.territory(c).len() as u32);
        let dead = Color::ALL.map(|c| analysis.dead_stones(c));
        let prisoners = board.prisoner_counts();
        let black = (territory[0] + dead[0] + prisoners[0]) as f32;
        let white = (territory[1] + dead[1] + prisoners[1]) as f32 + komi;
        Self {
            owner: analysis.owners().to_vec(),
            territory,
            dead,
            prisoners,
            komi,
            black,
            white,
            undecided: analysis.undecided().len(),
        }
    }

    /// Black's score minus White's.
    #[inline]
    pub fn margin(&self) -> f32 {
        self.black - self.white
    }

    pub fn outcome(&self) -> Outcome {
        let margin = self.margin();
        if margin > 0.0 {
            Outcome::Win {
                winner: Color::Black,
                margin,
            }
        } else if margin < 0.0 {
            Outcome::Win {
                winner: Color::White,
                margin: -margin,
            }
        } else {
            Outcome::Tie
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Black {} (territory {}, dead {}, prisoners {}), White {} (territory {}, dead {}, prisoners {}, komi {}): {}",
            self.black,
            self.territory[0],
            self.dead[0],
            self.prisoners[0],
            self.white,
            self.territory[1],
            self.dead[1],
            self.prisoners[1],
            self.komi,
            self.outcome()
        )
    }
}
