use forest_fire_core::{CellBurned, CellCensus, ForestError, TileCoord};
use std::ptr;

use crate::error::{DefaultFfiError, ForestFireErrorCode};
use crate::helpers::{
    handle_ffi_result_error, instance_from_ptr, track_error, with_forest, with_forest_mut,
    write_optional,
};
use crate::instance::ForestFireInstance;

/// A cell that finished burning, for the smoke effect layer.
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnedCell {
    pub tile_x: usize,
    pub tile_y: usize,
    pub cell_x: usize,
    pub cell_y: usize,
    /// World position of the cell centre at ground height
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Smoke particles to emit
    pub spawn_count: u32,
}

impl From<CellBurned> for BurnedCell {
    fn from(event: CellBurned) -> Self {
        Self {
            tile_x: event.tile.x,
            tile_y: event.tile.y,
            cell_x: event.cell.x,
            cell_y: event.cell.y,
            x: event.position.x,
            y: event.position.y,
            z: event.position.z,
            spawn_count: event.spawn_count,
        }
    }
}

/// Cell counts by state across the whole forest.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForestCensus {
    pub empty: usize,
    pub alive: usize,
    pub burning: usize,
    pub burned: usize,
}

impl From<CellCensus> for ForestCensus {
    fn from(census: CellCensus) -> Self {
        Self {
            empty: census.empty,
            alive: census.alive,
            burning: census.burning,
            burned: census.burned,
        }
    }
}

/// Take the cells that burned out during the last step.
///
/// Returns a borrowed pointer via `out_array`. **DO NOT FREE THIS POINTER**.
/// It stays valid until the next call to this function on the same instance.
/// Events are handed out once; a second call before the next step yields none.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_len` and `out_array` must be valid, non-null pointers for writes.
///
/// # Example Usage (C++)
/// ```cpp
/// forest_fire_tick_step(forest, nullptr);
/// uintptr_t len = 0;
/// const BurnedCell* burned = nullptr;
/// if (forest_fire_take_burned_cells(forest, &len, &burned) == ForestFireErrorCode::Ok) {
///     for (uintptr_t i = 0; i < len; i++) {
///         spawn_smoke(burned[i].x, burned[i].y, burned[i].z, burned[i].spawn_count);
///     }
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn forest_fire_take_burned_cells(
    ptr: *const ForestFireInstance,
    out_len: *mut usize,
    out_array: *mut *const BurnedCell,
) -> ForestFireErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_len"));
    }

    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultFfiError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut snapshot = instance
            .burned_snapshot
            .lock()
            .map_err(|_| DefaultFfiError::lock_poisoned("burned_snapshot"))?;
        snapshot.clear();

        with_forest_mut(instance, |forest| {
            snapshot.extend(forest.drain_events().map(BurnedCell::from));
        })?;

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }
        Ok::<(), DefaultFfiError>(())
    });

    if result != ForestFireErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }

    result
}

/// Raw state byte of a cell: `0` empty, `1..=63` living tree (value is
/// accumulated heat), `64..=254` burning, `255` burned.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_state` must be a valid, non-null pointer for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_cell_state(
    ptr: *const ForestFireInstance,
    tile_x: usize,
    tile_y: usize,
    cell_x: usize,
    cell_y: usize,
    out_state: *mut u8,
) -> ForestFireErrorCode {
    if out_state.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_state"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let coord = TileCoord::new(tile_x, tile_y);
        let state = with_forest(instance, |forest| forest.cell_state(coord, cell_x, cell_y))??;
        unsafe { *out_state = state };
        Ok::<(), DefaultFfiError>(())
    })
}

/// Visual variant `0..4` of a cell, stable for the lifetime of the forest.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_variant` must be a valid, non-null pointer for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_cell_variant(
    ptr: *const ForestFireInstance,
    tile_x: usize,
    tile_y: usize,
    cell_x: usize,
    cell_y: usize,
    out_variant: *mut u8,
) -> ForestFireErrorCode {
    if out_variant.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_variant"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let coord = TileCoord::new(tile_x, tile_y);
        let variant =
            with_forest(instance, |forest| forest.cell_variant(coord, cell_x, cell_y))??;
        unsafe { *out_variant = variant };
        Ok::<(), DefaultFfiError>(())
    })
}

/// Whether the cell under world position `(x, z)` is burning.
///
/// Returns `false` outside the forest, for a null pointer, or when the lock
/// is poisoned; check `forest_fire_get_last_error_code` to tell them apart.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `forest_fire_new`.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_fire_presence(
    ptr: *const ForestFireInstance,
    x: f32,
    z: f32,
) -> bool {
    let mut burning = false;
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        burning = with_forest(instance, |forest| forest.fire_presence(x, z))?;
        Ok::<(), DefaultFfiError>(())
    });
    burning
}

/// Count cells by state across the forest.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_census` must be a valid, non-null pointer for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_census(
    ptr: *const ForestFireInstance,
    out_census: *mut ForestCensus,
) -> ForestFireErrorCode {
    if out_census.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_census"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let census = with_forest(instance, |forest| forest.census())?;
        unsafe { *out_census = census.into() };
        Ok::<(), DefaultFfiError>(())
    })
}

/// Copy one tile's cells into a caller-owned buffer, `x`-major
/// (`buffer[x * tile_size + y]`), for mesh and colour rebuilds.
///
/// `buffer_len` must be at least `tile_size * tile_size`. `out_written`
/// (optional) receives the number of bytes copied.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `buffer` must be valid for `buffer_len` byte writes.
/// - `out_written` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_copy_tile_cells(
    ptr: *const ForestFireInstance,
    tile_x: usize,
    tile_y: usize,
    buffer: *mut u8,
    buffer_len: usize,
    out_written: *mut usize,
) -> ForestFireErrorCode {
    if buffer.is_null() {
        return track_error(&DefaultFfiError::null_pointer("buffer"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        // SAFETY: the caller guarantees `buffer` holds `buffer_len` writable bytes
        let target = unsafe { std::slice::from_raw_parts_mut(buffer, buffer_len) };

        let written = with_forest(instance, |forest| {
            let coord = TileCoord::new(tile_x, tile_y);
            let Some(tile) = forest.tile(coord) else {
                return Err(DefaultFfiError::from(ForestError::TileOutOfRange {
                    tile_x: tile_x as i64,
                    tile_y: tile_y as i64,
                }));
            };
            let cells = tile.cells();
            if target.len() < cells.len() {
                return Err(DefaultFfiError::invalid_parameter(format!(
                    "buffer of {} bytes cannot hold {} cells",
                    target.len(),
                    cells.len()
                )));
            }
            target[..cells.len()].copy_from_slice(cells);
            Ok(cells.len())
        })??;

        unsafe { write_optional(out_written, written) };
        Ok::<(), DefaultFfiError>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::{forest_fire_add_tree, forest_fire_ignite};
    use crate::instance::forest_fire_destroy;
    use crate::simulation::{forest_fire_set_active, forest_fire_tick_step};
    use crate::test_support::seeded_instance;

    #[test]
    fn test_cell_queries() {
        let instance = seeded_instance();
        unsafe {
            forest_fire_add_tree(instance, 5.0, 2.0, ptr::null_mut());
            forest_fire_ignite(instance, 5.0, 2.0, ptr::null_mut());

            let mut state = 0;
            assert_eq!(
                forest_fire_cell_state(instance, 1, 0, 1, 2, &mut state),
                ForestFireErrorCode::Ok
            );
            assert_eq!(state, 64);
            assert!(forest_fire_fire_presence(instance, 5.5, 2.5));
            assert!(!forest_fire_fire_presence(instance, 0.5, 0.5));
            assert!(!forest_fire_fire_presence(instance, -3.0, 0.5));

            assert_eq!(
                forest_fire_cell_state(instance, 2, 0, 0, 0, &mut state),
                ForestFireErrorCode::OutOfRange
            );

            let mut variant = u8::MAX;
            assert_eq!(
                forest_fire_cell_variant(instance, 1, 0, 1, 2, &mut variant),
                ForestFireErrorCode::Ok
            );
            assert!(variant < 4);

            let mut census = ForestCensus::default();
            assert_eq!(forest_fire_census(instance, &mut census), ForestFireErrorCode::Ok);
            assert_eq!(
                census,
                ForestCensus {
                    empty: 63,
                    alive: 0,
                    burning: 1,
                    burned: 0
                }
            );
            forest_fire_destroy(instance);
        }
    }

    #[test]
    fn test_copy_tile_cells() {
        let instance = seeded_instance();
        unsafe {
            forest_fire_add_tree(instance, 4.0, 1.0, ptr::null_mut());

            let mut buffer = [u8::MAX; 16];
            let mut written = 0;
            assert_eq!(
                forest_fire_copy_tile_cells(
                    instance,
                    1,
                    0,
                    buffer.as_mut_ptr(),
                    buffer.len(),
                    &mut written
                ),
                ForestFireErrorCode::Ok
            );
            assert_eq!(written, 16);
            assert_eq!(buffer[1], 1);
            assert_eq!(buffer.iter().filter(|&&c| c == 0).count(), 15);

            let mut small = [0_u8; 4];
            assert_eq!(
                forest_fire_copy_tile_cells(
                    instance,
                    1,
                    0,
                    small.as_mut_ptr(),
                    small.len(),
                    ptr::null_mut()
                ),
                ForestFireErrorCode::InvalidParameter
            );
            forest_fire_destroy(instance);
        }
    }

    #[test]
    fn test_take_burned_cells() {
        let instance = seeded_instance();
        unsafe {
            forest_fire_add_tree(instance, 1.0, 1.0, ptr::null_mut());
            forest_fire_ignite(instance, 1.0, 1.0, ptr::null_mut());
            forest_fire_set_active(instance, true);

            let mut collected = Vec::new();
            for _ in 0..5000 {
                forest_fire_tick_step(instance, ptr::null_mut());
                let mut len = 0;
                let mut array = ptr::null();
                assert_eq!(
                    forest_fire_take_burned_cells(instance, &mut len, &mut array),
                    ForestFireErrorCode::Ok
                );
                if len > 0 {
                    collected.extend_from_slice(std::slice::from_raw_parts(array, len));
                    break;
                }
            }

            assert_eq!(collected.len(), 1);
            let burned = collected[0];
            assert_eq!((burned.tile_x, burned.tile_y), (0, 0));
            assert_eq!((burned.cell_x, burned.cell_y), (1, 1));
            assert_eq!((burned.x, burned.z), (1.5, 1.5));
            assert_eq!(burned.spawn_count, 5);

            // Already taken
            let mut len = usize::MAX;
            let mut array = ptr::null();
            forest_fire_take_burned_cells(instance, &mut len, &mut array);
            assert_eq!(len, 0);

            assert_eq!(
                forest_fire_take_burned_cells(instance, ptr::null_mut(), &mut array),
                ForestFireErrorCode::NullPointer
            );
            forest_fire_destroy(instance);
        }
    }
}
