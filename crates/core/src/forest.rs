//! Grid coordinator
//!
//! [`Forest`] owns every tile in an arena indexed by grid position, maps world
//! coordinates to tile/cell addresses, and runs the amortized scheduler.
//! Tiles never hold references to each other: while one tile ticks, the rest
//! of the arena is lent to it as a read-only [`Siblings`] view.

use crate::cell::{Cell, CellCensus, CellKind};
use crate::config::ForestConfig;
use crate::error::{ForestError, ForestResult};
use crate::hash::VariantHash;
use crate::sampling::{RngSource, UniformSource};
use crate::scheduler::RowScheduler;
use crate::terrain::{DensityField, FlatTerrain, HeightField, NoiseDensity};
use crate::tile::{ForestTile, LocalCell, Siblings, SpreadRates, TileCoord};
use crate::wind::{WindMatrix, WindModel};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Upper bound of the offsets drawn by [`Forest::regenerate_random`]
const RANDOM_OFFSET_RANGE: f32 = 10_000.0;

/// A cell that finished burning during a scheduling step.
///
/// Consumed by the smoke effect layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBurned {
    /// Tile holding the cell
    pub tile: TileCoord,
    /// Cell position inside the tile
    pub cell: LocalCell,
    /// Centre of the cell at ground height
    pub position: Vector3<f32>,
    /// Smoke particles to emit
    pub spawn_count: u32,
}

/// Summary of one call to [`Forest::tick_step`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Rows ticked, in order. Empty when the simulation is paused.
    pub rows: Vec<usize>,
    /// Cells whose value changed
    pub cells_changed: usize,
    /// Cells that reached the burned state
    pub cells_burned: usize,
}

impl StepReport {
    /// Whether any rows were ticked
    pub fn ran(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Arena minus the tile currently being ticked.
struct ArenaView<'a> {
    before: &'a [ForestTile],
    after: &'a [ForestTile],
    hole: usize,
    width: usize,
    height: usize,
}

impl Siblings for ArenaView<'_> {
    fn sibling(&self, tile_x: i64, tile_y: i64) -> Option<&ForestTile> {
        let index = arena_index(tile_x, tile_y, self.width, self.height)?;
        match index.cmp(&self.hole) {
            std::cmp::Ordering::Less => self.before.get(index),
            std::cmp::Ordering::Greater => self.after.get(index - self.hole - 1),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Whole arena, for queries outside a tick.
struct FullView<'a> {
    tiles: &'a [ForestTile],
    width: usize,
    height: usize,
}

impl Siblings for FullView<'_> {
    fn sibling(&self, tile_x: i64, tile_y: i64) -> Option<&ForestTile> {
        arena_index(tile_x, tile_y, self.width, self.height).and_then(|i| self.tiles.get(i))
    }
}

#[inline]
fn arena_index(tile_x: i64, tile_y: i64, width: usize, height: usize) -> Option<usize> {
    let x = usize::try_from(tile_x).ok()?;
    let y = usize::try_from(tile_y).ok()?;
    (x < width && y < height).then_some(x * height + y)
}

/// Result of a cell edit that tells whether any cell changed
trait EditOutcome {
    fn changed(&self) -> bool;
}

impl EditOutcome for bool {
    fn changed(&self) -> bool {
        *self
    }
}

/// Number of cells touched
impl EditOutcome for usize {
    fn changed(&self) -> bool {
        *self > 0
    }
}

/// The tiled forest and its scheduler.
pub struct Forest<S = RngSource<StdRng>> {
    config: ForestConfig,
    /// `tiles[x * height + y]`
    tiles: Vec<ForestTile>,
    scheduler: RowScheduler,
    active: bool,
    wind_model: WindModel,
    wind: WindMatrix,
    source: S,
    variants: VariantHash,
    height_field: Box<dyn HeightField + Send + Sync>,
    density_field: Box<dyn DensityField + Send + Sync>,
    offsets: (f32, f32),
    events: Vec<CellBurned>,
    dirty: FxHashSet<TileCoord>,
    burned_scratch: Vec<LocalCell>,
    steps: u64,
}

impl Forest<RngSource<StdRng>> {
    /// Forest driven by an entropy-seeded generator
    pub fn new(config: ForestConfig) -> ForestResult<Self> {
        Self::with_source(config, RngSource::from_entropy())
    }

    /// Forest driven by a reproducible generator
    pub fn seeded(config: ForestConfig, seed: u64) -> ForestResult<Self> {
        Self::with_source(config, RngSource::seeded(seed))
    }
}

impl<S: UniformSource> Forest<S> {
    /// Build an empty forest, validating `config` first.
    pub fn with_source(config: ForestConfig, source: S) -> ForestResult<Self> {
        config.validate()?;

        let tiles = (0..config.width)
            .flat_map(|x| (0..config.height).map(move |y| TileCoord::new(x, y)))
            .map(|coord| ForestTile::new(coord, config.tile_size))
            .collect();

        info!(
            "Forest initialized: {}x{} tiles of {}x{} cells, {} rows per step",
            config.width, config.height, config.tile_size, config.tile_size, config.rows_per_step
        );

        Ok(Self {
            scheduler: RowScheduler::new(config.width, config.rows_per_step),
            wind_model: WindModel::new(config.wind_multiplier),
            wind: WindMatrix::calm(),
            variants: VariantHash::new(config.variant_seed),
            height_field: Box::new(FlatTerrain::default()),
            density_field: Box::new(NoiseDensity::default()),
            offsets: (0.0, 0.0),
            events: Vec::new(),
            dirty: FxHashSet::default(),
            burned_scratch: Vec::new(),
            steps: 0,
            active: false,
            tiles,
            source,
            config,
        })
    }

    pub fn with_height_field(mut self, field: impl HeightField + Send + Sync + 'static) -> Self {
        self.height_field = Box::new(field);
        self
    }

    pub fn with_density_field(mut self, field: impl DensityField + Send + Sync + 'static) -> Self {
        self.density_field = Box::new(field);
        self
    }

    /// Configuration the forest was built with
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Random source driving spread, burn and random ignition
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    // ------------------------------------------------------------------
    // Addressing
    // ------------------------------------------------------------------

    /// Map a world position `(x, z)` to its tile and local cell.
    pub fn locate(&self, world_x: f32, world_z: f32) -> ForestResult<(TileCoord, LocalCell)> {
        let out_of_range = || ForestError::OutOfRange {
            x: world_x,
            z: world_z,
        };
        if !world_x.is_finite() || !world_z.is_finite() {
            return Err(out_of_range());
        }

        let size = self.config.tile_size as f32;
        let tile_x = (world_x / size).floor();
        let tile_z = (world_z / size).floor();
        if tile_x < 0.0
            || tile_z < 0.0
            || tile_x >= self.config.width as f32
            || tile_z >= self.config.height as f32
        {
            return Err(out_of_range());
        }

        let (tile_x, tile_z) = (tile_x as usize, tile_z as usize);
        let tile_size = self.config.tile_size;
        // Float rounding can land exactly on the far edge
        let local = |world: f32, tile: usize| {
            ((world - (tile * tile_size) as f32).floor() as usize).min(tile_size - 1)
        };
        let (local_x, local_z) = (local(world_x, tile_x), local(world_z, tile_z));

        Ok((TileCoord::new(tile_x, tile_z), LocalCell::new(local_x, local_z)))
    }

    /// World position of a cell's centre at ground height
    pub fn cell_center(&self, tile: TileCoord, cell: LocalCell) -> Vector3<f32> {
        let size = self.config.tile_size;
        let x = (tile.x * size + cell.x) as f32 + 0.5;
        let z = (tile.y * size + cell.y) as f32 + 0.5;
        Vector3::new(x, self.height_field.height(x, z), z)
    }

    fn tile_index(&self, coord: TileCoord) -> ForestResult<usize> {
        arena_index(
            coord.x as i64,
            coord.y as i64,
            self.config.width,
            self.config.height,
        )
        .ok_or(ForestError::TileOutOfRange {
            tile_x: coord.x as i64,
            tile_y: coord.y as i64,
        })
    }

    // ------------------------------------------------------------------
    // Renderer accessors
    // ------------------------------------------------------------------

    /// Tile at a grid position, `None` off the grid
    pub fn tile(&self, coord: TileCoord) -> Option<&ForestTile> {
        self.tile_index(coord).ok().map(|i| &self.tiles[i])
    }

    /// Direct access to a tile's cells. The tile is marked dirty.
    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut ForestTile> {
        let index = self.tile_index(coord).ok()?;
        self.dirty.insert(coord);
        Some(&mut self.tiles[index])
    }

    /// Every tile, `x`-major
    pub fn tiles(&self) -> impl Iterator<Item = &ForestTile> {
        self.tiles.iter()
    }

    /// Raw state byte of a cell
    pub fn cell_state(&self, tile: TileCoord, x: usize, y: usize) -> ForestResult<Cell> {
        let index = self.tile_index(tile)?;
        self.tiles[index]
            .cell(x, y)
            .ok_or(ForestError::CellOutOfRange {
                x: x as i64,
                y: y as i64,
            })
    }

    /// Classified state of a cell
    pub fn cell_kind(&self, tile: TileCoord, x: usize, y: usize) -> ForestResult<CellKind> {
        self.cell_state(tile, x, y).map(CellKind::from_cell)
    }

    /// Stable colour variant of a cell, keyed on its global cell coordinates
    pub fn cell_variant(&self, tile: TileCoord, x: usize, y: usize) -> ForestResult<u8> {
        self.cell_state(tile, x, y)?;
        let size = self.config.tile_size;
        Ok(self
            .variants
            .variant((tile.x * size + x) as i32, (tile.y * size + y) as i32))
    }

    /// Read-only view of every tile for boundary queries
    pub fn siblings(&self) -> impl Siblings + '_ {
        FullView {
            tiles: &self.tiles,
            width: self.config.width,
            height: self.config.height,
        }
    }

    /// Whether the cell under a world position is burning. Off-grid is `false`.
    pub fn fire_presence(&self, world_x: f32, world_z: f32) -> bool {
        let Ok((coord, cell)) = self.locate(world_x, world_z) else {
            return false;
        };
        self.tile(coord).is_some_and(|tile| {
            tile.fire_presence(cell.x as i64, cell.y as i64, &self.siblings())
        })
    }

    /// Cell counts summed over every tile
    pub fn census(&self) -> CellCensus {
        let mut census = CellCensus::default();
        for tile in &self.tiles {
            census.merge(&tile.census());
        }
        census
    }

    /// Tiles changed since the last call, for mesh/colour rebuilds
    pub fn take_dirty_tiles(&mut self) -> FxHashSet<TileCoord> {
        std::mem::take(&mut self.dirty)
    }

    // ------------------------------------------------------------------
    // Edits keyed by world position
    // ------------------------------------------------------------------

    fn edit<T: EditOutcome>(
        &mut self,
        world_x: f32,
        world_z: f32,
        apply: impl FnOnce(&mut ForestTile, LocalCell) -> ForestResult<T>,
    ) -> ForestResult<T> {
        let (coord, cell) = self.locate(world_x, world_z)?;
        let index = self.tile_index(coord)?;
        let result = apply(&mut self.tiles[index], cell)?;
        if result.changed() {
            self.dirty.insert(coord);
        }
        Ok(result)
    }

    /// Plant a tree. No-op on an occupied cell.
    pub fn add_tree(&mut self, world_x: f32, world_z: f32) -> ForestResult<bool> {
        trace!("add_tree at ({world_x}, {world_z})");
        self.edit(world_x, world_z, |tile, cell| tile.add_tree(cell.x, cell.y))
    }

    /// Clear a cell.
    pub fn remove_tree(&mut self, world_x: f32, world_z: f32) -> ForestResult<bool> {
        trace!("remove_tree at ({world_x}, {world_z})");
        self.edit(world_x, world_z, |tile, cell| tile.remove_tree(cell.x, cell.y))
    }

    /// Set a living tree on fire.
    pub fn ignite(&mut self, world_x: f32, world_z: f32) -> ForestResult<bool> {
        trace!("ignite at ({world_x}, {world_z})");
        self.edit(world_x, world_z, |tile, cell| tile.ignite(cell.x, cell.y))
    }

    /// Put out fire around a cell. Returns how many cells were reverted.
    pub fn extinguish(&mut self, world_x: f32, world_z: f32) -> ForestResult<usize> {
        trace!("extinguish at ({world_x}, {world_z})");
        self.edit(world_x, world_z, |tile, cell| tile.extinguish(cell.x, cell.y))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Whether scheduling steps tick any rows
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start or pause scheduling steps
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            info!("Forest simulation {}", if active { "started" } else { "paused" });
        }
        self.active = active;
    }

    /// Current neighbour weights
    pub fn wind(&self) -> &WindMatrix {
        &self.wind
    }

    /// Recompute the neighbour weights for `speed` and bearing `angle` (radians)
    pub fn set_wind(&mut self, speed: f32, angle: f32) {
        self.wind = self.wind_model.matrix(speed, angle);
        info!("Wind changed: speed={:.2}, angle={:.2} rad", speed, angle);
        debug!("Wind weights: {:?}", self.wind.weights());
    }

    /// Replace the neighbour weights directly
    pub fn set_wind_matrix(&mut self, wind: WindMatrix) {
        self.wind = wind;
    }

    /// Clear every tile. Tiles are reused, not rebuilt.
    pub fn reset_all(&mut self) {
        for tile in &mut self.tiles {
            tile.reset();
            self.dirty.insert(tile.coord());
        }
        self.events.clear();
        info!("Forest cleared");
    }

    /// Start one random fire per tile where a living tree can be found
    /// within the retry budget. Returns how many fires were started.
    pub fn ignite_random_in_all_tiles(&mut self) -> usize {
        let attempts = self.config.random_ignite_attempts;
        let mut started = 0;
        for tile in &mut self.tiles {
            if let Some(cell) = tile.random_ignite(&mut self.source, attempts) {
                trace!("Random fire in tile {:?} at {:?}", tile.coord(), cell);
                self.dirty.insert(tile.coord());
                started += 1;
            } else {
                debug!(
                    "No living tree found in tile {:?} after {} attempts",
                    tile.coord(),
                    attempts
                );
            }
        }
        info!("Random ignition started {} fires", started);
        started
    }

    /// Rebuild initial tree placement from the density collaborator using
    /// the given offsets. Returns the number of trees planted.
    pub fn regenerate(&mut self, offset_x: f32, offset_y: f32) -> usize {
        self.offsets = (offset_x, offset_y);
        let size = self.config.tile_size;
        let threshold = self.config.tree_threshold;
        let density = &self.density_field;

        let mut planted = 0;
        for tile in &mut self.tiles {
            let origin = tile.coord();
            planted += tile.plant_where(|x, y| {
                let world_x = (origin.x * size + x) as f32;
                let world_z = (origin.y * size + y) as f32;
                density.density(offset_x, offset_y, world_x, world_z) > threshold
            });
            self.dirty.insert(origin);
        }
        self.events.clear();

        info!(
            "Forest regenerated with offsets ({:.2}, {:.2}): {} trees",
            offset_x, offset_y, planted
        );
        planted
    }

    /// [`regenerate`](Self::regenerate) with offsets drawn from the random source
    pub fn regenerate_random(&mut self) -> usize {
        let offset_x = self.source.next_unit() * RANDOM_OFFSET_RANGE;
        let offset_y = self.source.next_unit() * RANDOM_OFFSET_RANGE;
        self.regenerate(offset_x, offset_y)
    }

    /// Offsets used by the last regeneration
    pub fn offsets(&self) -> (f32, f32) {
        self.offsets
    }

    /// Scheduling steps taken so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Row scheduler state
    pub fn scheduler(&self) -> &RowScheduler {
        &self.scheduler
    }

    /// Run one scheduling step: tick the next rows of tiles in order.
    ///
    /// Does nothing while paused. Burn-out events of the previous step are
    /// discarded; read this step's with [`events`](Self::events) or
    /// [`drain_events`](Self::drain_events).
    pub fn tick_step(&mut self) -> StepReport {
        if !self.active {
            return StepReport::default();
        }

        self.events.clear();
        let rates = SpreadRates {
            fire_spread_speed: self.config.fire_spread_speed,
            burn_speed: self.config.burn_speed,
        };
        let height = self.config.height;

        let mut report = StepReport {
            rows: self.scheduler.advance().collect(),
            ..StepReport::default()
        };

        for &row in &report.rows {
            for y in 0..height {
                let hole = row * height + y;
                let (before, rest) = self.tiles.split_at_mut(hole);
                let Some((tile, after)) = rest.split_first_mut() else {
                    continue;
                };
                let view = ArenaView {
                    before,
                    after,
                    hole,
                    width: self.config.width,
                    height,
                };

                self.burned_scratch.clear();
                let changed = tile.tick(
                    &view,
                    &self.wind,
                    &rates,
                    &mut self.source,
                    &mut self.burned_scratch,
                );
                let coord = tile.coord();
                if changed > 0 {
                    self.dirty.insert(coord);
                }
                report.cells_changed += changed;
                report.cells_burned += self.burned_scratch.len();

                for i in 0..self.burned_scratch.len() {
                    let cell = self.burned_scratch[i];
                    let event = CellBurned {
                        tile: coord,
                        cell,
                        position: self.cell_center(coord, cell),
                        spawn_count: self.config.smoke_spawn_count,
                    };
                    self.events.push(event);
                }
            }
        }

        self.steps += 1;
        debug!(
            "Step {}: rows {:?}, {} cells changed, {} burned out",
            self.steps, report.rows, report.cells_changed, report.cells_burned
        );
        report
    }

    /// Burn-out events from the last step
    pub fn events(&self) -> &[CellBurned] {
        &self.events
    }

    /// Take the burn-out events from the last step
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, CellBurned> {
        self.events.drain(..)
    }
}

impl<S> std::fmt::Debug for Forest<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forest")
            .field("config", &self.config)
            .field("active", &self.active)
            .field("scheduler", &self.scheduler)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}
