use crate::error::{with_last_error_mut, DefaultFfiError, FfiError, ForestFireErrorCode};
use crate::instance::{FfiForest, ForestFireInstance};
use std::ffi::CString;
use std::sync::MutexGuard;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FfiError) -> ForestFireErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = ForestFireErrorCode::Ok;
    });
}

/// Record the error of a failed result, clear the error state otherwise.
pub(crate) fn track_result<T, E>(result: Result<T, E>) -> Result<T, ForestFireErrorCode>
where
    E: Into<DefaultFfiError>,
{
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(err) => Err(track_error(&err.into())),
    }
}

/// Run `body` and collapse its result into an error code.
pub(crate) fn handle_ffi_result_error<F, E>(body: F) -> ForestFireErrorCode
where
    F: FnOnce() -> Result<(), E>,
    E: Into<DefaultFfiError>,
{
    match track_result(body()) {
        Ok(()) => ForestFireErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow an instance from a raw pointer.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `forest_fire_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const ForestFireInstance,
) -> Result<&'a ForestFireInstance, DefaultFfiError> {
    // SAFETY: the caller guarantees `ptr` came from `Box::into_raw` and is still live
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultFfiError::null_pointer("ptr"))
}

fn lock_forest(instance: &ForestFireInstance) -> Result<MutexGuard<'_, FfiForest>, DefaultFfiError> {
    instance
        .forest
        .lock()
        .map_err(|_| DefaultFfiError::lock_poisoned("forest"))
}

/// Run `f` with shared access to the forest.
pub(crate) fn with_forest<F, R>(instance: &ForestFireInstance, f: F) -> Result<R, DefaultFfiError>
where
    F: FnOnce(&FfiForest) -> R,
{
    let forest = lock_forest(instance)?;
    Ok(f(&forest))
}

/// Run `f` with exclusive access to the forest.
pub(crate) fn with_forest_mut<F, R>(
    instance: &ForestFireInstance,
    f: F,
) -> Result<R, DefaultFfiError>
where
    F: FnOnce(&mut FfiForest) -> R,
{
    let mut forest = lock_forest(instance)?;
    Ok(f(&mut forest))
}

/// Write `value` through `out` when the caller asked for it.
///
/// # Safety
/// `out` must be null or valid for writes.
#[inline]
pub(crate) unsafe fn write_optional<T>(out: *mut T, value: T) {
    if !out.is_null() {
        // SAFETY: non-null and valid for writes per the caller's contract
        unsafe { out.write(value) };
    }
}
