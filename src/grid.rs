//! Intersections, groups and the grid that owns them.
//!
//! The grid stores one [`Intersection`] per point and a table of [`Group`]s.
//! An intersection refers to its group through a [`GroupId`] index into that
//! table instead of a pointer, so cloning a grid (once per ply) never aliases
//! group state between boards.
//!
//! Group and liberty bookkeeping is incremental: placing or removing a stone
//! only touches the groups around that point. [`Grid::rebuild`] recomputes the
//! whole partition from scratch and [`Grid::is_consistent`] checks that both
//! agree, which the tests exercise on random move sequences.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Stone colour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Both colours, Black first.
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Array slot used for per-colour counters (Black = 0, White = 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// +1 for Black, -1 for White. Scores are kept from Black's side.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// A grid coordinate, row 0 at the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Index of a group in the grid's group table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

/// What a group is made of.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKind {
    /// Connected stones of one colour.
    Stones(Color),
    /// Maximal connected set of points without stones of the given colour.
    Region { enclosed_by: Color },
}

/// A maximal connected set of same-class intersections.
///
/// For stone groups `liberties` holds the adjacent empty points. For regions
/// it holds the region's own empty points, which is what Benson's algorithm
/// compares against chain liberties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub members: BTreeSet<usize>,
    pub liberties: BTreeSet<usize>,
}

impl Group {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Smallest member index, used as a stable representative.
    #[inline]
    pub fn anchor(&self) -> Option<usize> {
        self.members.first().copied()
    }
}

/// One grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Intersection {
    pub point: Point,
    pub stone: Option<Color>,
    pub group: Option<GroupId>,
}

/// Adjacency shared by every clone of a grid.
#[derive(Debug)]
struct Topology {
    rows: usize,
    cols: usize,
    neighbors: Vec<Vec<usize>>,
}

impl Topology {
    fn new(rows: usize, cols: usize) -> Self {
        let mut neighbors = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let mut adjacent = Vec::with_capacity(4);
                if row > 0 {
                    adjacent.push((row - 1) * cols + col);
                }
                if col > 0 {
                    adjacent.push(row * cols + col - 1);
                }
                if row + 1 < rows {
                    adjacent.push((row + 1) * cols + col);
                }
                if col + 1 < cols {
                    adjacent.push(row * cols + col + 1);
                }
                neighbors.push(adjacent);
            }
        }
        Self {
            rows,
            cols,
            neighbors,
        }
    }
}

/// Result of Benson's algorithm for one colour.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Life {
    /// Unconditionally alive chains.
    pub chains: Vec<GroupId>,
    /// Points of those chains.
    pub stones: BTreeSet<usize>,
    /// Regions enclosed by the alive chains and vital to at least one of them.
    pub regions: Vec<Group>,
}

impl Life {
    #[inline]
    pub fn is_alive(&self, idx: usize) -> bool {
        self.stones.contains(&idx)
    }
}

/// The stone layout as a matrix of intersections plus its group partition.
#[derive(Clone, Debug)]
pub struct Grid {
    topology: Arc<Topology>,
    cells: Vec<Intersection>,
    groups: Vec<Option<Group>>,
    free: Vec<usize>,
}

impl Grid {
    /// Create an empty grid. Dimension limits are enforced by the board.
    pub fn new(rows: usize, cols: usize) -> Self {
        let cells = (0..rows * cols)
            .map(|idx| Intersection {
                point: Point::new(idx / cols, idx % cols),
                stone: None,
                group: None,
            })
            .collect();
        Self {
            topology: Arc::new(Topology::new(rows, cols)),
            cells,
            groups: Vec::new(),
            free: Vec::new(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.topology.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.topology.cols
    }

    /// Number of intersections.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of a point, if it lies on the grid.
    #[inline]
    pub fn index(&self, point: Point) -> Option<usize> {
        (point.row < self.rows() && point.col < self.cols()).then(|| point.row * self.cols() + point.col)
    }

    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        self.cells[idx].point
    }

    #[inline]
    pub fn stone(&self, idx: usize) -> Option<Color> {
        self.cells[idx].stone
    }

    #[inline]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.topology.neighbors[idx]
    }

    /// Iterate over all intersections in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Intersection> + '_ {
        self.cells.iter()
    }

    /// Iterate over the empty point indices.
    pub fn empty_points(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.stone.is_none())
            .map(|(idx, _)| idx)
    }

    /// Number of stones of a colour.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| c.stone == Some(color)).count()
    }

    #[inline]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0).and_then(Option::as_ref)
    }

    /// The stone group occupying a point.
    #[inline]
    pub fn group_at(&self, idx: usize) -> Option<&Group> {
        self.cells[idx].group.and_then(|id| self.group(id))
    }

    /// Iterate over the live entries of the group table.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|g| (GroupId(i), g)))
    }

    /// Whether two grids hold the same stones.
    pub fn same_layout(&self, other: &Grid) -> bool {
        self.cells.len() == other.cells.len()
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(a, b)| a.stone == b.stone)
    }

    // -------------------------------------------------------------------------
    // Incremental maintenance
    // -------------------------------------------------------------------------

    fn alloc(&mut self, group: Group) -> GroupId {
        let id = match self.free.pop() {
            Some(slot) => {
                self.groups[slot] = Some(group);
                slot
            }
            None => {
                self.groups.push(Some(group));
                self.groups.len() - 1
            }
        };
        let id = GroupId(id);
        if let Some(group) = &self.groups[id.0] {
            for &m in &group.members {
                self.cells[m].group = Some(id);
            }
        }
        id
    }

    fn take(&mut self, id: GroupId) -> Option<Group> {
        let group = self.groups.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(group)
    }

    /// Distinct stone groups adjacent to a point.
    fn adjacent_groups(&self, idx: usize) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self
            .neighbors(idx)
            .iter()
            .filter_map(|&n| self.cells[n].group)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Put a stone on an empty point, merge it with friendly neighbours and
    /// remove opponent groups left without liberties.
    ///
    /// Returns the captured points. The caller decides whether a resulting
    /// zero-liberty group (suicide) is acceptable.
    pub fn place(&mut self, idx: usize, color: Color) -> Vec<usize> {
        debug_assert!(self.cells[idx].stone.is_none());
        self.cells[idx].stone = Some(color);

        let adjacent = self.adjacent_groups(idx);
        for &id in &adjacent {
            if let Some(group) = self.groups[id.0].as_mut() {
                group.liberties.remove(&idx);
            }
        }

        let mut members = BTreeSet::from([idx]);
        let mut liberties: BTreeSet<usize> = self
            .neighbors(idx)
            .iter()
            .copied()
            .filter(|&n| self.cells[n].stone.is_none())
            .collect();
        let mut enemies = Vec::new();
        for id in adjacent {
            match self.group(id).map(|g| g.kind) {
                Some(GroupKind::Stones(c)) if c == color => {
                    if let Some(friend) = self.take(id) {
                        members.extend(friend.members);
                        liberties.extend(friend.liberties);
                    }
                }
                Some(_) => enemies.push(id),
                None => {}
            }
        }
        self.alloc(Group {
            kind: GroupKind::Stones(color),
            members,
            liberties,
        });

        let mut captured = Vec::new();
        for id in enemies {
            if self.group(id).is_some_and(|g| g.liberties.is_empty()) {
                captured.extend(self.remove_group(id));
            }
        }
        captured
    }

    /// Remove a whole group, handing its points back as liberties to the
    /// groups around it.
    fn remove_group(&mut self, id: GroupId) -> Vec<usize> {
        let Some(group) = self.take(id) else {
            return Vec::new();
        };
        for &m in &group.members {
            self.cells[m].stone = None;
            self.cells[m].group = None;
        }
        for &m in &group.members {
            for &n in &self.topology.neighbors[m] {
                if let Some(other) = self.cells[n].group {
                    if let Some(g) = self.groups[other.0].as_mut() {
                        g.liberties.insert(m);
                    }
                }
            }
        }
        group.members.into_iter().collect()
    }

    /// Take a single stone off the grid, splitting its group if needed.
    /// Returns the removed colour.
    pub fn remove(&mut self, idx: usize) -> Option<Color> {
        let color = self.cells[idx].stone?;
        let id = self.cells[idx].group?;
        let group = self.take(id)?;
        self.cells[idx].stone = None;
        self.cells[idx].group = None;

        let mut rest: BTreeSet<usize> = group.members;
        rest.remove(&idx);
        for &m in &rest {
            self.cells[m].group = None;
        }
        while let Some(&start) = rest.first() {
            let members = self.flood(start, |stone| stone == Some(color));
            for m in &members {
                rest.remove(m);
            }
            let liberties = self.liberties_of(&members);
            self.alloc(Group {
                kind: GroupKind::Stones(color),
                members,
                liberties,
            });
        }

        for &n in &self.topology.neighbors[idx] {
            if let Some(other) = self.cells[n].group {
                if let Some(g) = self.groups[other.0].as_mut() {
                    g.liberties.insert(idx);
                }
            }
        }
        Some(color)
    }

    fn flood(&self, start: usize, belongs: impl Fn(Option<Color>) -> bool) -> BTreeSet<usize> {
        let mut members = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(pt) = stack.pop() {
            if !members.insert(pt) {
                continue;
            }
            for &n in self.neighbors(pt) {
                if !members.contains(&n) && belongs(self.cells[n].stone) {
                    stack.push(n);
                }
            }
        }
        members
    }

    fn liberties_of(&self, members: &BTreeSet<usize>) -> BTreeSet<usize> {
        members
            .iter()
            .flat_map(|&m| self.neighbors(m).iter().copied())
            .filter(|&n| self.cells[n].stone.is_none())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Full recomputation
    // -------------------------------------------------------------------------

    /// Discard the group table and rebuild it from the stones alone.
    pub fn rebuild(&mut self) {
        self.groups.clear();
        self.free.clear();
        for cell in &mut self.cells {
            cell.group = None;
        }
        for idx in 0..self.cells.len() {
            let Some(color) = self.cells[idx].stone else {
                continue;
            };
            if self.cells[idx].group.is_some() {
                continue;
            }
            let members = self.flood(idx, |stone| stone == Some(color));
            let liberties = self.liberties_of(&members);
            self.alloc(Group {
                kind: GroupKind::Stones(color),
                members,
                liberties,
            });
        }
    }

    /// The group partition in a form independent of table slots.
    pub fn partition(&self) -> Vec<(GroupKind, Vec<usize>, Vec<usize>)> {
        let mut parts: Vec<_> = self
            .groups()
            .map(|(_, g)| {
                (
                    g.kind,
                    g.members.iter().copied().collect(),
                    g.liberties.iter().copied().collect(),
                )
            })
            .collect();
        parts.sort();
        parts
    }

    /// Whether the incrementally maintained groups equal a full rebuild and
    /// every stone points at the group that contains it.
    pub fn is_consistent(&self) -> bool {
        let back_refs = self.cells.iter().enumerate().all(|(idx, cell)| match cell.stone {
            None => cell.group.is_none(),
            Some(color) => self.group_at(idx).is_some_and(|g| {
                g.kind == GroupKind::Stones(color) && g.members.contains(&idx)
            }),
        });
        let mut full = self.clone();
        full.rebuild();
        back_refs && full.partition() == self.partition()
    }

    // -------------------------------------------------------------------------
    // Regions and unconditional life
    // -------------------------------------------------------------------------

    /// Maximal regions of points holding no stone of `color`.
    pub fn regions(&self, color: Color) -> Vec<Group> {
        let mut seen = vec![false; self.cells.len()];
        let mut regions = Vec::new();
        for idx in 0..self.cells.len() {
            if seen[idx] || self.cells[idx].stone == Some(color) {
                continue;
            }
            let members = self.flood(idx, |stone| stone != Some(color));
            for &m in &members {
                seen[m] = true;
            }
            let liberties = members
                .iter()
                .copied()
                .filter(|&m| self.cells[m].stone.is_none())
                .collect();
            regions.push(Group {
                kind: GroupKind::Region { enclosed_by: color },
                members,
                liberties,
            });
        }
        regions
    }

    /// Stone groups of `color` adjacent to a region.
    fn border(&self, region: &Group, color: Color) -> BTreeSet<GroupId> {
        region
            .members
            .iter()
            .flat_map(|&m| self.neighbors(m).iter().copied())
            .filter(|&n| self.cells[n].stone == Some(color))
            .filter_map(|n| self.cells[n].group)
            .collect()
    }

    /// Benson's algorithm: the chains of `color` that cannot be captured
    /// whatever the opponent plays, even if `color` never answers.
    ///
    /// A region is vital to a chain when each of its empty points is a
    /// liberty of that chain. Chains with fewer than two vital regions and
    /// regions touching a discarded chain are dropped until nothing changes.
    pub fn unconditional_life(&self, color: Color) -> Life {
        let regions = self.regions(color);
        let borders: Vec<BTreeSet<GroupId>> =
            regions.iter().map(|r| self.border(r, color)).collect();
        let vital: Vec<BTreeSet<GroupId>> = regions
            .iter()
            .zip(&borders)
            .map(|(region, border)| {
                if region.liberties.is_empty() {
                    return BTreeSet::new();
                }
                border
                    .iter()
                    .copied()
                    .filter(|&id| {
                        self.group(id)
                            .is_some_and(|g| region.liberties.is_subset(&g.liberties))
                    })
                    .collect()
            })
            .collect();

        let mut chains: BTreeSet<GroupId> = self
            .groups()
            .filter(|(_, g)| g.kind == GroupKind::Stones(color))
            .map(|(id, _)| id)
            .collect();
        let mut healthy: BTreeSet<usize> = (0..regions.len()).collect();
        loop {
            let before = (chains.len(), healthy.len());
            healthy.retain(|&r| borders[r].is_subset(&chains));
            chains.retain(|id| healthy.iter().filter(|&&r| vital[r].contains(id)).count() >= 2);
            if (chains.len(), healthy.len()) == before {
                break;
            }
        }

        let stones = chains
            .iter()
            .filter_map(|&id| self.group(id))
            .flat_map(|g| g.members.iter().copied())
            .collect();
        let regions = regions
            .into_iter()
            .enumerate()
            .filter(|(i, _)| healthy.contains(i) && !vital[*i].is_disjoint(&chains))
            .map(|(_, r)| r)
            .collect();
        Life {
            chains: chains.into_iter().collect(),
            stones,
            regions,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                let ch = match self.cells[row * self.cols() + col].stone {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch}")?;
                if col + 1 < self.cols() {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Build a grid from rows of `X` (Black), `O` (White) and `.` (empty).
/// Other characters (spaces) are ignored. Intended for setting up positions.
pub fn grid_from_rows(rows: &[&str]) -> Grid {
    let parsed: Vec<Vec<Option<Color>>> = rows
        .iter()
        .map(|line| {
            line.chars()
                .filter_map(|ch| match ch {
                    'X' | 'x' | 'B' => Some(Some(Color::Black)),
                    'O' | 'o' | 'W' => Some(Some(Color::White)),
                    '.' | '+' => Some(None),
                    _ => None,
                })
                .collect()
        })
        .collect();
    let cols = parsed.first().map_or(0, Vec::len);
    let mut grid = Grid::new(parsed.len(), cols);
    for (row, line) in parsed.iter().enumerate() {
        for (col, stone) in line.iter().enumerate().take(cols) {
            grid.cells[row * cols + col].stone = *stone;
        }
    }
    grid.rebuild();
    grid
}
