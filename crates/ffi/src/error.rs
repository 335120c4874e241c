use forest_fire_core::ForestError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` is returned to the caller
/// - `msg()` is kept in thread-local storage for `forest_fire_get_last_error`
pub(crate) trait FfiError {
    fn code(&self) -> ForestFireErrorCode;

    fn msg(&self) -> &str;
}

/// Error code plus message for everything the FFI layer reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultFfiError {
    code: ForestFireErrorCode,
    msg: String,
}

impl DefaultFfiError {
    /// Null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: ForestFireErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// A panic in another thread poisoned the forest lock.
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: ForestFireErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: ForestFireErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<ForestError> for DefaultFfiError {
    fn from(error: ForestError) -> Self {
        let code = match error {
            ForestError::Config(_) => ForestFireErrorCode::InvalidConfig,
            ForestError::OutOfRange { .. }
            | ForestError::TileOutOfRange { .. }
            | ForestError::CellOutOfRange { .. } => ForestFireErrorCode::OutOfRange,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl FfiError for DefaultFfiError {
    fn code(&self) -> ForestFireErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by forest functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForestFireErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Forest configuration rejected (zero dimension, probability outside `[0, 1]`, ...).
    InvalidConfig = 3,

    /// World position, tile or cell lies outside the forest.
    OutOfRange = 4,

    /// Invalid parameter passed to function.
    InvalidParameter = 5,
}

impl From<DefaultFfiError> for ForestFireErrorCode {
    fn from(error: DefaultFfiError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (message, code).
    /// The `CString` is owned here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, ForestFireErrorCode)> =
        const { RefCell::new((None, ForestFireErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, ForestFireErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, ForestFireErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns `null` if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// ForestFireInstance* forest = nullptr;
/// ForestFireErrorCode err = forest_fire_new(forest_fire_default_config(), &forest);
/// if (err != ForestFireErrorCode::Ok) {
///     printf("Forest creation failed: %s\n", forest_fire_get_last_error());
/// }
/// ```
#[no_mangle]
pub extern "C" fn forest_fire_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code (`Ok` if the last call succeeded).
///
/// Error state is per-thread.
#[no_mangle]
pub extern "C" fn forest_fire_get_last_error_code() -> ForestFireErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
