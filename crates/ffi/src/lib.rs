//! C ABI for the forest fire simulation.
//!
//! Every entry point returns a [`ForestFireErrorCode`] (0 = success) and
//! records a message retrievable with `forest_fire_get_last_error`. Instances
//! are created with `forest_fire_new` and released with `forest_fire_destroy`.
//!
//! Typical frame loop on the host side:
//!
//! 1. apply player edits (`forest_fire_ignite`, `forest_fire_extinguish`, ...)
//! 2. `forest_fire_tick_step`
//! 3. `forest_fire_take_burned_cells` to spawn smoke
//! 4. `forest_fire_copy_tile_cells` for tiles that need recolouring

mod edits;
mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;

pub use edits::{
    forest_fire_add_tree, forest_fire_extinguish, forest_fire_ignite, forest_fire_remove_tree,
};
pub use error::{forest_fire_get_last_error, forest_fire_get_last_error_code, ForestFireErrorCode};
pub use instance::{
    forest_fire_default_config, forest_fire_destroy, forest_fire_new, ForestFireConfig,
    ForestFireInstance,
};
pub use queries::{
    forest_fire_cell_state, forest_fire_cell_variant, forest_fire_census,
    forest_fire_copy_tile_cells, forest_fire_fire_presence, forest_fire_take_burned_cells,
    BurnedCell, ForestCensus,
};
pub use simulation::{
    forest_fire_ignite_random, forest_fire_regenerate, forest_fire_regenerate_random,
    forest_fire_reset, forest_fire_set_active, forest_fire_set_wind, forest_fire_tick_step,
};

#[cfg(test)]
mod test_support {
    use crate::instance::{forest_fire_default_config, forest_fire_new, ForestFireInstance};
    use crate::ForestFireErrorCode;
    use std::ptr;

    /// 2×2 tiles of 4×4 cells, empty, seeded
    pub(crate) fn seeded_instance() -> *mut ForestFireInstance {
        let mut config = forest_fire_default_config();
        config.tile_size = 4;
        config.width = 2;
        config.height = 2;
        config.use_seed = true;
        config.seed = 7;

        let mut instance = ptr::null_mut();
        let code = unsafe { forest_fire_new(config, &mut instance) };
        assert_eq!(code, ForestFireErrorCode::Ok);
        assert!(!instance.is_null());
        instance
    }
}
