//! Cell edits keyed by world position `(x, z)`.
//!
//! Every edit returns `OutOfRange` when the position falls outside the
//! forest; the forest is left untouched in that case.

use forest_fire_core::{Forest, ForestResult};

use crate::error::{DefaultFfiError, ForestFireErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_forest_mut, write_optional};
use crate::instance::ForestFireInstance;

/// Shared body of the edit entry points.
unsafe fn apply_edit<T>(
    ptr: *const ForestFireInstance,
    out: *mut T,
    edit: impl FnOnce(&mut Forest) -> ForestResult<T>,
) -> ForestFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let value = with_forest_mut(instance, edit)??;
        unsafe { write_optional(out, value) };
        Ok::<(), DefaultFfiError>(())
    })
}

/// Plant a tree at a world position. No-op on an occupied cell.
///
/// `out_changed` (optional) receives whether a tree was planted.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_changed` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_add_tree(
    ptr: *const ForestFireInstance,
    x: f32,
    z: f32,
    out_changed: *mut bool,
) -> ForestFireErrorCode {
    unsafe { apply_edit(ptr, out_changed, |forest| forest.add_tree(x, z)) }
}

/// Clear the cell at a world position, whatever it holds.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_changed` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_remove_tree(
    ptr: *const ForestFireInstance,
    x: f32,
    z: f32,
    out_changed: *mut bool,
) -> ForestFireErrorCode {
    unsafe { apply_edit(ptr, out_changed, |forest| forest.remove_tree(x, z)) }
}

/// Set the living tree at a world position on fire.
///
/// Empty ground, burning and burned cells are left alone.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_changed` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_ignite(
    ptr: *const ForestFireInstance,
    x: f32,
    z: f32,
    out_changed: *mut bool,
) -> ForestFireErrorCode {
    unsafe { apply_edit(ptr, out_changed, |forest| forest.ignite(x, z)) }
}

/// Put out the fire at a world position, and around it when the cell is
/// away from the tile edge. Doused cells become fresh living trees.
///
/// `out_reverted` (optional) receives the number of cells doused.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `forest_fire_new`.
/// - `out_reverted` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn forest_fire_extinguish(
    ptr: *const ForestFireInstance,
    x: f32,
    z: f32,
    out_reverted: *mut usize,
) -> ForestFireErrorCode {
    unsafe { apply_edit(ptr, out_reverted, |forest| forest.extinguish(x, z)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::forest_fire_get_last_error_code;
    use crate::instance::forest_fire_destroy;
    use crate::test_support::seeded_instance;
    use std::ptr;

    #[test]
    fn test_edit_round_trip() {
        let instance = seeded_instance();
        unsafe {
            let mut changed = false;
            assert_eq!(
                forest_fire_add_tree(instance, 1.5, 6.5, &mut changed),
                ForestFireErrorCode::Ok
            );
            assert!(changed);
            assert_eq!(
                forest_fire_ignite(instance, 1.5, 6.5, &mut changed),
                ForestFireErrorCode::Ok
            );
            assert!(changed);

            let mut reverted = 0;
            assert_eq!(
                forest_fire_extinguish(instance, 1.5, 6.5, &mut reverted),
                ForestFireErrorCode::Ok
            );
            assert_eq!(reverted, 1);

            assert_eq!(
                forest_fire_remove_tree(instance, 1.5, 6.5, ptr::null_mut()),
                ForestFireErrorCode::Ok
            );
            assert_eq!(
                forest_fire_ignite(instance, 1.5, 6.5, &mut changed),
                ForestFireErrorCode::Ok
            );
            assert!(!changed);
            forest_fire_destroy(instance);
        }
    }

    #[test]
    fn test_edit_outside_forest() {
        let instance = seeded_instance();
        unsafe {
            let mut changed = true;
            assert_eq!(
                forest_fire_add_tree(instance, 8.0, 1.0, &mut changed),
                ForestFireErrorCode::OutOfRange
            );
            assert!(changed, "output untouched on error");
            assert_eq!(forest_fire_get_last_error_code(), ForestFireErrorCode::OutOfRange);
            forest_fire_destroy(instance);
        }
    }
}
