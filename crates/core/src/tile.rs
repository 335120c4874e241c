//! Tile automaton
//!
//! A tile owns one `S × S` block of cells and advances it one generation per
//! scheduled tick. Cells are visited in row-major order (`x` outer, `y` inner)
//! and updated in place, so later cells see the updates of earlier ones.
//!
//! Fire on the far side of a tile edge is resolved through [`Siblings`]: the
//! coordinate is shifted into the adjacent tile's frame and that tile answers.

use crate::cell::{self, Cell, CellCensus, ALIVE, BURNED, EMPTY, FIRE};
use crate::error::{ForestError, ForestResult};
use crate::sampling::UniformSource;
use crate::wind::{WindMatrix, NEIGHBOR_OFFSETS};
use serde::{Deserialize, Serialize};

/// Grid position of a tile. `x` runs along world X, `y` along world Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column along world X
    pub x: usize,
    /// Row along world Z
    pub y: usize,
}

impl TileCoord {
    /// Tile at column `x`, row `y`
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Cell position inside a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalCell {
    /// Offset along world X, `0..size`
    pub x: usize,
    /// Offset along world Z, `0..size`
    pub y: usize,
}

impl LocalCell {
    /// Cell at `(x, y)` inside its tile
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Per-tick probabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadRates {
    /// Chance a living tree gathers heat from burning neighbours
    pub fire_spread_speed: f32,
    /// Chance a burning tree advances one step toward `BURNED`
    pub burn_speed: f32,
}

/// Read-only lookup of neighbouring tiles by signed grid position.
///
/// Positions outside the grid yield `None`, which callers treat as "no fire".
pub trait Siblings {
    fn sibling(&self, tile_x: i64, tile_y: i64) -> Option<&ForestTile>;
}

/// A tile with no neighbours
#[derive(Debug, Clone, Copy, Default)]
pub struct Isolated;

impl Siblings for Isolated {
    fn sibling(&self, _tile_x: i64, _tile_y: i64) -> Option<&ForestTile> {
        None
    }
}

/// One square block of the forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestTile {
    coord: TileCoord,
    size: usize,
    /// `cells[x * size + y]`
    cells: Vec<Cell>,
}

impl ForestTile {
    /// Empty tile of side `size` at `coord`
    pub fn new(coord: TileCoord, size: usize) -> Self {
        Self {
            coord,
            size,
            cells: vec![EMPTY; size * size],
        }
    }

    /// Grid position of this tile
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Cells per side
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cells, `x`-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells sharing one `x`
    pub fn row(&self, x: usize) -> Option<&[Cell]> {
        (x < self.size).then(|| &self.cells[x * self.size..(x + 1) * self.size])
    }

    /// State of one cell, `None` outside the tile
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.size && y < self.size).then(|| self.cells[self.index(x, y)])
    }

    /// Cell counts for this tile
    pub fn census(&self) -> CellCensus {
        self.cells.iter().collect()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    fn checked_index(&self, x: usize, y: usize) -> ForestResult<usize> {
        if x < self.size && y < self.size {
            Ok(self.index(x, y))
        } else {
            Err(ForestError::CellOutOfRange {
                x: x as i64,
                y: y as i64,
            })
        }
    }

    /// Whether the in-bounds cell at `(x, y)` is burning; `false` outside.
    #[inline]
    fn burning_here(&self, x: i64, y: i64) -> bool {
        let size = self.size as i64;
        (0..size).contains(&x)
            && (0..size).contains(&y)
            && cell::is_burning(self.cells[self.index(x as usize, y as usize)])
    }

    /// Fire presence at a local coordinate that may lie just outside the tile.
    ///
    /// Out-of-bounds coordinates are wrapped into the adjacent tile's frame and
    /// answered by that tile. The delegation makes at most one hop per axis;
    /// anything still outside after the hop, or with no tile there, is `false`.
    pub fn fire_presence(&self, x: i64, y: i64, siblings: &impl Siblings) -> bool {
        let size = self.size as i64;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            return self.burning_here(x, y);
        }

        let (tile_dx, local_x) = wrap_axis(x, size);
        let (tile_dy, local_y) = wrap_axis(y, size);
        let tile_x = self.coord.x as i64 + tile_dx;
        let tile_y = self.coord.y as i64 + tile_dy;

        siblings
            .sibling(tile_x, tile_y)
            .is_some_and(|tile| tile.burning_here(local_x, local_y))
    }

    /// Wind-weighted count of burning neighbours around `(x, y)`
    fn neighbour_influence(
        &self,
        x: usize,
        y: usize,
        siblings: &impl Siblings,
        wind: &WindMatrix,
    ) -> f32 {
        let (x, y) = (x as i64, y as i64);
        NEIGHBOR_OFFSETS
            .iter()
            .filter(|&&(dx, dy)| {
                self.fire_presence(x + i64::from(dx), y + i64::from(dy), siblings)
            })
            .map(|&(dx, dy)| wind.weight(dx, dy))
            .sum()
    }

    /// Advance every cell one generation.
    ///
    /// - Living trees, with probability `fire_spread_speed`, gain heat equal to
    ///   the truncated wind-weighted count of burning neighbours. Gain saturates
    ///   one short of `BURNED`, so a living tree never burns out in one tick.
    /// - Burning trees, with probability `burn_speed`, advance one step. Cells
    ///   reaching `BURNED` are appended to `burned_out`.
    ///
    /// Returns the number of cells whose value changed.
    pub fn tick(
        &mut self,
        siblings: &impl Siblings,
        wind: &WindMatrix,
        rates: &SpreadRates,
        source: &mut (impl UniformSource + ?Sized),
        burned_out: &mut Vec<LocalCell>,
    ) -> usize {
        let mut changed = 0;

        for x in 0..self.size {
            for y in 0..self.size {
                let index = self.index(x, y);
                let state = self.cells[index];

                if cell::is_alive(state) {
                    if source.next_unit() < rates.fire_spread_speed {
                        let gain = self.neighbour_influence(x, y, siblings, wind) as u32;
                        if gain > 0 {
                            let heated = (u32::from(state) + gain).min(u32::from(BURNED - 1));
                            self.cells[index] = heated as Cell;
                            changed += 1;
                        }
                    }
                } else if cell::is_burning(state) && source.next_unit() < rates.burn_speed {
                    let next = state + 1;
                    self.cells[index] = next;
                    changed += 1;
                    if next == BURNED {
                        burned_out.push(LocalCell::new(x, y));
                    }
                }
            }
        }

        changed
    }

    /// Plant a fresh tree on empty ground. Returns whether the cell changed.
    pub fn add_tree(&mut self, x: usize, y: usize) -> ForestResult<bool> {
        let index = self.checked_index(x, y)?;
        if self.cells[index] != EMPTY {
            return Ok(false);
        }
        self.cells[index] = ALIVE;
        Ok(true)
    }

    /// Set a living tree on fire. Empty, burning and burned cells are untouched.
    pub fn ignite(&mut self, x: usize, y: usize) -> ForestResult<bool> {
        let index = self.checked_index(x, y)?;
        if !cell::is_alive(self.cells[index]) {
            return Ok(false);
        }
        self.cells[index] = FIRE;
        Ok(true)
    }

    /// Clear the cell whatever it holds.
    pub fn remove_tree(&mut self, x: usize, y: usize) -> ForestResult<bool> {
        let index = self.checked_index(x, y)?;
        let changed = self.cells[index] != EMPTY;
        self.cells[index] = EMPTY;
        Ok(changed)
    }

    /// Put out fire at `(x, y)`, restoring a fresh living tree.
    ///
    /// When the target is not on the tile edge its eight neighbours are doused
    /// as well. Returns how many cells were reverted.
    pub fn extinguish(&mut self, x: usize, y: usize) -> ForestResult<usize> {
        let index = self.checked_index(x, y)?;
        let mut reverted = 0;

        if cell::is_burning(self.cells[index]) {
            self.cells[index] = ALIVE;
            reverted += 1;
        }

        let interior = (1..self.size - 1).contains(&x) && (1..self.size - 1).contains(&y);
        if interior {
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let nx = x.wrapping_add_signed(dx as isize);
                let ny = y.wrapping_add_signed(dy as isize);
                let neighbour = self.index(nx, ny);
                if cell::is_burning(self.cells[neighbour]) {
                    self.cells[neighbour] = ALIVE;
                    reverted += 1;
                }
            }
        }

        Ok(reverted)
    }

    /// Try up to `attempts` random cells and ignite the first living,
    /// non-burning tree found. Gives up quietly when none turns up.
    pub fn random_ignite(
        &mut self,
        source: &mut (impl UniformSource + ?Sized),
        attempts: usize,
    ) -> Option<LocalCell> {
        for _ in 0..attempts {
            let x = source.next_index(self.size);
            let y = source.next_index(self.size);
            let index = self.index(x, y);
            if cell::is_alive(self.cells[index]) {
                self.cells[index] = FIRE;
                return Some(LocalCell::new(x, y));
            }
        }
        None
    }

    /// Clear every cell.
    pub fn reset(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Replace every cell with a fresh tree where `plant(x, y)` holds, empty
    /// ground elsewhere. Returns the number of trees planted.
    pub fn plant_where(&mut self, mut plant: impl FnMut(usize, usize) -> bool) -> usize {
        let mut planted = 0;
        for x in 0..self.size {
            for y in 0..self.size {
                let index = self.index(x, y);
                if plant(x, y) {
                    self.cells[index] = ALIVE;
                    planted += 1;
                } else {
                    self.cells[index] = EMPTY;
                }
            }
        }
        planted
    }

    /// Overwrite a cell with a raw value
    pub fn set_cell(&mut self, x: usize, y: usize, value: Cell) -> ForestResult<()> {
        let index = self.checked_index(x, y)?;
        self.cells[index] = value;
        Ok(())
    }
}

/// Split an axis coordinate lying at most one tile outside `[0, size)` into
/// (tile shift, local coordinate in the shifted tile).
#[inline]
fn wrap_axis(coord: i64, size: i64) -> (i64, i64) {
    if coord < 0 {
        (-1, coord + size)
    } else if coord >= size {
        (1, coord - size)
    } else {
        (0, coord)
    }
}
