use forest_fire_core::{Forest, ForestConfig};
use std::ptr;
use std::sync::Mutex;

use crate::error::{DefaultFfiError, ForestFireErrorCode};
use crate::helpers::{track_error, track_result};
use crate::queries::BurnedCell;

pub(crate) type FfiForest = Forest;

/// C-compatible forest configuration.
///
/// Start from `forest_fire_default_config()` and override fields as needed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestFireConfig {
    /// Cells per tile side
    pub tile_size: usize,
    /// Tiles along world X
    pub width: usize,
    /// Tiles along world Z
    pub height: usize,
    /// Per-tick chance a living tree gathers heat, `[0, 1]`
    pub fire_spread_speed: f32,
    /// Per-tick chance a burning tree advances, `[0, 1]`
    pub burn_speed: f32,
    /// Scales the wind bias on neighbour weights
    pub wind_multiplier: f32,
    /// Tile rows ticked per call to `forest_fire_tick_step`
    pub rows_per_step: usize,
    /// Tries per tile before `forest_fire_ignite_random` gives up on it
    pub random_ignite_attempts: usize,
    /// Density score above which `forest_fire_regenerate` plants a tree
    pub tree_threshold: f32,
    /// Smoke particles reported per burned-out cell
    pub smoke_spawn_count: u32,
    /// Seed of the per-cell colour variant hash
    pub variant_seed: u32,
    /// Seed for the random source. Ignored unless `use_seed` is set.
    pub seed: u64,
    /// Use `seed` instead of an entropy-seeded generator
    pub use_seed: bool,
}

impl From<ForestFireConfig> for ForestConfig {
    fn from(config: ForestFireConfig) -> Self {
        ForestConfig {
            tile_size: config.tile_size,
            width: config.width,
            height: config.height,
            fire_spread_speed: config.fire_spread_speed,
            burn_speed: config.burn_speed,
            wind_multiplier: config.wind_multiplier,
            rows_per_step: config.rows_per_step,
            random_ignite_attempts: config.random_ignite_attempts,
            tree_threshold: config.tree_threshold,
            smoke_spawn_count: config.smoke_spawn_count,
            variant_seed: config.variant_seed,
        }
    }
}

/// Default configuration: 6×6 tiles of 60×60 cells, spread and burn chance 0.6.
#[no_mangle]
pub extern "C" fn forest_fire_default_config() -> ForestFireConfig {
    let defaults = ForestConfig::default();
    ForestFireConfig {
        tile_size: defaults.tile_size,
        width: defaults.width,
        height: defaults.height,
        fire_spread_speed: defaults.fire_spread_speed,
        burn_speed: defaults.burn_speed,
        wind_multiplier: defaults.wind_multiplier,
        rows_per_step: defaults.rows_per_step,
        random_ignite_attempts: defaults.random_ignite_attempts,
        tree_threshold: defaults.tree_threshold,
        smoke_spawn_count: defaults.smoke_spawn_count,
        variant_seed: defaults.variant_seed,
        seed: 0,
        use_seed: false,
    }
}

/// A forest shared with a host engine.
///
/// # Thread Safety
/// The forest sits behind a `Mutex`; every call locks it for its duration, so
/// the instance may be used from any thread.
pub struct ForestFireInstance {
    pub(crate) forest: Mutex<FfiForest>,
    /// Burn-out events handed to the caller by `forest_fire_take_burned_cells`.
    /// Reused across calls.
    pub(crate) burned_snapshot: Mutex<Vec<BurnedCell>>,
}

impl ForestFireInstance {
    pub(crate) fn new(config: &ForestFireConfig) -> Result<Box<Self>, DefaultFfiError> {
        let core_config = ForestConfig::from(*config);
        let forest = if config.use_seed {
            Forest::seeded(core_config, config.seed)?
        } else {
            Forest::new(core_config)?
        };

        Ok(Box::new(Self {
            forest: Mutex::new(forest),
            burned_snapshot: Mutex::new(Vec::new()),
        }))
    }
}

/// Create a forest and return it via out-parameter.
///
/// The forest starts empty and paused. Call `forest_fire_regenerate` to plant
/// trees and `forest_fire_set_active` to start the simulation.
///
/// Returns
/// - `ForestFireErrorCode::Ok` (0) with a valid pointer in `out_instance`
/// - `ForestFireErrorCode::NullPointer` if `out_instance` is null
/// - `ForestFireErrorCode::InvalidConfig` if `config` is rejected; `out_instance` is set to null
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned instance and MUST call `forest_fire_destroy`
///   exactly once.
///
/// Example (C++)
/// ```cpp
/// ForestFireConfig config = forest_fire_default_config();
/// config.use_seed = true;
/// config.seed = 42;
/// ForestFireInstance* forest = nullptr;
/// if (forest_fire_new(config, &forest) != ForestFireErrorCode::Ok) {
///     fprintf(stderr, "%s\n", forest_fire_get_last_error());
///     return;
/// }
/// forest_fire_regenerate_random(forest, nullptr);
/// forest_fire_set_active(forest, true);
/// // ...
/// forest_fire_destroy(forest);
/// ```
#[no_mangle]
pub unsafe extern "C" fn forest_fire_new(
    config: ForestFireConfig,
    out_instance: *mut *mut ForestFireInstance,
) -> ForestFireErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_instance"));
    }

    match track_result(ForestFireInstance::new(&config)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            ForestFireErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy a forest created by `forest_fire_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `forest_fire_new` and not freed already.
/// - The caller must not use the pointer afterwards.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_destroy(ptr: *mut ForestFireInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `forest_fire_new` and not yet freed
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
