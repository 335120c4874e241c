//! Cell state model
//!
//! Every grid position holds a single byte. The byte is both the state and the
//! progress counter:
//!
//! | Range            | Meaning                                        |
//! |------------------|------------------------------------------------|
//! | `0`              | empty ground                                   |
//! | `1`              | fresh living tree                              |
//! | `2..FIRE`        | living tree that has absorbed heat from fires  |
//! | `FIRE..BURNED`   | burning tree, counting up toward `BURNED`      |
//! | `BURNED`         | burned out, inert                              |

use serde::{Deserialize, Serialize};

/// Raw cell byte.
pub type Cell = u8;

/// No tree.
pub const EMPTY: Cell = 0;
/// Minimum living-tree value. Planting and extinguishing both produce this.
pub const ALIVE: Cell = 1;
/// First burning value. Heat accumulated by a living tree ignites it here.
pub const FIRE: Cell = 64;
/// Terminal sentinel for a fully burned tree.
pub const BURNED: Cell = 255;

/// Living tree (fresh or hot), not yet on fire
#[inline]
pub const fn is_alive(cell: Cell) -> bool {
    cell >= ALIVE && cell < FIRE
}

/// Tree currently on fire
#[inline]
pub const fn is_burning(cell: Cell) -> bool {
    cell >= FIRE && cell < BURNED
}

/// Tree fully burned
#[inline]
pub const fn is_burned(cell: Cell) -> bool {
    cell == BURNED
}

/// Decoded view of a cell byte for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Bare ground
    Empty,
    /// Living tree. `heat` is `0` for a fresh tree and grows toward
    /// `FIRE - ALIVE` as burning neighbours warm it up.
    Alive { heat: u8 },
    /// Burning tree. `progress` runs from `0` at ignition to `BURNED - FIRE - 1`.
    Burning { progress: u8 },
    /// Burned out
    Burned,
}

impl CellKind {
    pub const fn from_cell(cell: Cell) -> Self {
        match cell {
            EMPTY => CellKind::Empty,
            BURNED => CellKind::Burned,
            c if c >= FIRE => CellKind::Burning { progress: c - FIRE },
            c => CellKind::Alive { heat: c - ALIVE },
        }
    }

    /// Anything but bare ground
    pub const fn has_tree(&self) -> bool {
        !matches!(self, CellKind::Empty)
    }
}

impl From<Cell> for CellKind {
    fn from(cell: Cell) -> Self {
        CellKind::from_cell(cell)
    }
}

/// Population counts per cell class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCensus {
    /// Bare ground
    pub empty: usize,
    /// Living trees, heated or not
    pub alive: usize,
    /// Trees on fire
    pub burning: usize,
    /// Burned-out trees
    pub burned: usize,
}

impl CellCensus {
    /// Count one cell
    pub fn record(&mut self, cell: Cell) {
        match CellKind::from_cell(cell) {
            CellKind::Empty => self.empty += 1,
            CellKind::Alive { .. } => self.alive += 1,
            CellKind::Burning { .. } => self.burning += 1,
            CellKind::Burned => self.burned += 1,
        }
    }

    /// Add another census into this one
    pub fn merge(&mut self, other: &CellCensus) {
        self.empty += other.empty;
        self.alive += other.alive;
        self.burning += other.burning;
        self.burned += other.burned;
    }

    /// Cells counted
    pub fn total(&self) -> usize {
        self.empty + self.alive + self.burning + self.burned
    }

    /// Cells holding a tree in any state
    pub fn trees(&self) -> usize {
        self.alive + self.burning + self.burned
    }
}

impl<'a> FromIterator<&'a Cell> for CellCensus {
    fn from_iter<I: IntoIterator<Item = &'a Cell>>(iter: I) -> Self {
        let mut census = CellCensus::default();
        for &cell in iter {
            census.record(cell);
        }
        census
    }
}
