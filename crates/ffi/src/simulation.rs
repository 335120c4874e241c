use crate::error::{DefaultFfiError, ForestFireErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_forest_mut, write_optional};
use crate::instance::ForestFireInstance;

/// Run one scheduling step.
///
/// Ticks the next tile rows. Does nothing while the forest is paused.
/// `out_burned` (optional) receives the number of cells that burned out;
/// fetch them with `forest_fire_take_burned_cells` before the next step.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_burned` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_tick_step(
    ptr: *const ForestFireInstance,
    out_burned: *mut usize,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let report = with_forest_mut(instance, |forest| forest.tick_step())?;
        unsafe { write_optional(out_burned, report.cells_burned) };
        Ok::<(), DefaultFfiError>(())
    })
}

/// Start (`true`) or pause (`false`) the simulation.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `forest_fire_new`.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_set_active(
    ptr: *const ForestFireInstance,
    active: bool,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_forest_mut(instance, |forest| forest.set_active(active))
    })
}

/// Set wind `speed` and bearing `angle` in radians.
///
/// The bearing is the direction the wind blows from, measured from world +X
/// toward +Z. Both values must be finite.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `forest_fire_new`.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_set_wind(
    ptr: *const ForestFireInstance,
    speed: f32,
    angle: f32,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        if !speed.is_finite() || !angle.is_finite() {
            return Err(DefaultFfiError::invalid_parameter(format!(
                "wind speed and angle must be finite, got ({speed}, {angle})"
            )));
        }
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_forest_mut(instance, |forest| forest.set_wind(speed, angle))
    })
}

/// Clear every tile to empty ground.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `forest_fire_new`.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_reset(
    ptr: *const ForestFireInstance,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_forest_mut(instance, |forest| forest.reset_all())
    })
}

/// Replant every tile from the density noise at the given offsets.
///
/// `out_planted` (optional) receives the number of trees planted.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_planted` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_regenerate(
    ptr: *const ForestFireInstance,
    offset_x: f32,
    offset_y: f32,
    out_planted: *mut usize,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        if !offset_x.is_finite() || !offset_y.is_finite() {
            return Err(DefaultFfiError::invalid_parameter(format!(
                "noise offsets must be finite, got ({offset_x}, {offset_y})"
            )));
        }
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let planted = with_forest_mut(instance, |forest| forest.regenerate(offset_x, offset_y))?;
        unsafe { write_optional(out_planted, planted) };
        Ok(())
    })
}

/// Replant every tile using random noise offsets.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_planted` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_regenerate_random(
    ptr: *const ForestFireInstance,
    out_planted: *mut usize,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let planted = with_forest_mut(instance, |forest| forest.regenerate_random())?;
        unsafe { write_optional(out_planted, planted) };
        Ok::<(), DefaultFfiError>(())
    })
}

/// Start one fire at a random living tree in every tile.
///
/// `out_started` (optional) receives the number of fires started. Tiles
/// where no tree turns up within the retry budget are skipped.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_started` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_ignite_random(
    ptr: *const ForestFireInstance,
    out_started: *mut usize,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let started = with_forest_mut(instance, |forest| forest.ignite_random_in_all_tiles())?;
        unsafe { write_optional(out_started, started) };
        Ok::<(), DefaultFfiError>(())
    })
}
