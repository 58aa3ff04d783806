//! Transposition table for search results.
//!
//! Entries are keyed by the canonical Zobrist key and carry the full
//! canonical [`Signature`], so a key collision is detected instead of
//! returning another position's value. The table belongs to a single solve.
//!
//! A value can also depend on the boards played before its position: a line
//! below it may recreate one of them and end in a long cycle. Every entry
//! records the fewest stones on any board its search visited. A board above
//! the position can only recur below it when it holds at least that many
//! stones, so a lookup names the most stones found on the boards above, and
//! the value is only used when that is fewer.

use std::collections::HashMap;

use crate::board::{Board, Move};
use crate::grid::Color;

use super::symmetry::Symmetry;

/// How a stored value relates to the true value of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// The search completed inside the window.
    Exact,
    /// Failed high: true value >= stored value.
    LowerBound,
    /// Failed low: true value <= stored value.
    UpperBound,
}

/// Exact description of a search position in a given orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    cells: Box<[u8]>,
    ko: Option<usize>,
    to_move: Color,
    passes: u8,
    balance: i64,
}

impl Signature {
    pub fn new(board: &Board, to_move: Color, symmetry: Symmetry) -> Self {
        let (rows, cols) = (board.rows(), board.cols());
        let mut cells = vec![0u8; board.grid().len()].into_boxed_slice();
        for (idx, cell) in board.grid().iter().enumerate() {
            cells[symmetry.map_index(idx, rows, cols)] = match cell.stone {
                None => 0,
                Some(Color::Black) => 1,
                Some(Color::White) => 2,
            };
        }
        Self {
            cells,
            ko: board.ko_index().map(|k| symmetry.map_index(k, rows, cols)),
            to_move,
            passes: board.passes(),
            balance: i64::from(board.prisoners(Color::Black)) - i64::from(board.prisoners(Color::White)),
        }
    }
}

/// A stored search result. `best` is expressed in the canonical orientation.
#[derive(Debug, Clone)]
pub struct TTEntry {
    pub signature: Signature,
    pub value: i32,
    pub entry_type: EntryType,
    pub depth: u8,
    /// The value does not depend on the depth horizon.
    pub complete: bool,
    /// Fewest stones on a board visited by the search below the position.
    pub min_stones: usize,
    pub best: Option<Move>,
}

/// Result of a probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Probe {
    /// Usable value and whether it is complete.
    pub value: Option<(i32, bool)>,
    /// The entry's `min_stones`, meaningful with a value.
    pub min_stones: usize,
    /// Best move of the stored entry, for ordering.
    pub best: Option<Move>,
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    probes: u64,
    hits: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a position up for a search of `depth` with window (alpha, beta).
    ///
    /// Complete entries are valid at any depth; others only at their own
    /// depth or shallower. `ancestors` is the most stones on a board above
    /// the position (other than its own layout). The best move is returned
    /// even when the value is not usable.
    pub fn probe(
        &mut self,
        key: u64,
        signature: &Signature,
        depth: u8,
        alpha: i32,
        beta: i32,
        ancestors: Option<usize>,
    ) -> Probe {
        self.probes += 1;
        let Some(entry) = self.entries.get(&key) else {
            return Probe::default();
        };
        if entry.signature != *signature {
            return Probe::default();
        }
        let deep_enough = entry.complete || entry.depth >= depth;
        let unreachable = ancestors.is_none_or(|stones| stones < entry.min_stones);
        let usable = deep_enough
            && unreachable
            && match entry.entry_type {
                EntryType::Exact => true,
                EntryType::LowerBound => entry.value >= beta,
                EntryType::UpperBound => entry.value <= alpha,
            };
        if usable {
            self.hits += 1;
        }
        Probe {
            value: usable.then_some((entry.value, entry.complete)),
            min_stones: entry.min_stones,
            best: entry.best,
        }
    }

    /// The stored best move of a position, for ordering.
    pub fn best_move(&self, key: u64, signature: &Signature) -> Option<Move> {
        self.entries
            .get(&key)
            .filter(|e| e.signature == *signature)
            .and_then(|e| e.best)
    }

    /// Store an entry, keeping a complete or deeper result already present
    /// for the same position.
    pub fn store(&mut self, key: u64, entry: TTEntry) {
        match self.entries.get(&key) {
            Some(old)
                if old.signature == entry.signature
                    && old.complete
                    && !entry.complete => {}
            Some(old)
                if old.signature == entry.signature
                    && old.complete == entry.complete
                    && old.depth > entry.depth => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (probes, usable hits).
    pub fn counters(&self) -> (u64, u64) {
        (self.probes, self.hits)
    }
}
