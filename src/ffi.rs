//! FFI bindings for Maternity Flux
//!
//! This module provides C-compatible functions for calling Flux from the mobile
//! host. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `mflux_free_string`.
//! Dates cross the boundary as `YYYY-MM-DD` strings; a NULL `now` means today.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{Local, NaiveDate};

use crate::dashboard::{DashboardBuilder, DashboardInput};
use crate::error::ComputeError;
use crate::metrics::MetricSeriesSummarizer;
use crate::pregnancy::PregnancyStageCalculator;
use crate::profile::parse_date_strict;
use crate::types::{MetricKind, MetricPoint};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Resolve the reference date; NULL means today in local time
unsafe fn resolve_now(now: *const c_char) -> Result<NaiveDate, ComputeError> {
    if now.is_null() {
        return Ok(Local::now().date_naive());
    }
    let raw = cstr_to_string(now)
        .ok_or_else(|| ComputeError::InvalidInput("now is not valid UTF-8".to_string()))?;
    parse_date_strict(&raw)
}

/// Write a result out as a C string, or record the error and return NULL
fn finish(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute gestational status JSON for an LMP date.
///
/// An unparseable or NULL `lmp` yields the "no data" status, not an error.
///
/// # Safety
/// - `lmp` and `now` must be valid null-terminated C strings or NULL.
/// - Returns a newly allocated string that must be freed with `mflux_free_string`.
/// - Returns NULL on error; call `mflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mflux_gestational_status(
    lmp: *const c_char,
    now: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let now = match resolve_now(now) {
        Ok(date) => date,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let status = match cstr_to_string(lmp) {
        Some(lmp) => PregnancyStageCalculator::compute_from_str(&lmp, now),
        None => PregnancyStageCalculator::compute_optional(None, now),
    };

    finish(serde_json::to_string(&status).map_err(ComputeError::JsonError))
}

/// Summarize a metric series given as a JSON array of `{time_label, value}`.
///
/// # Safety
/// - `kind` and `series_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `mflux_free_string`.
/// - Returns NULL on error; call `mflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mflux_summarize(
    kind: *const c_char,
    series_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let kind = match cstr_to_string(kind) {
        Some(s) => s,
        None => {
            set_last_error("Invalid kind string pointer");
            return ptr::null_mut();
        }
    };

    let series_str = match cstr_to_string(series_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result = kind.parse::<MetricKind>().and_then(|kind| {
        let series: Vec<MetricPoint> = serde_json::from_str(&series_str)?;
        let summary = MetricSeriesSummarizer::summarize(kind, &series);
        Ok(serde_json::to_string(&summary)?)
    });

    finish(result)
}

/// Build a dashboard snapshot JSON from a dashboard input JSON.
///
/// # Safety
/// - `input_json` must be a valid null-terminated C string.
/// - `now` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `mflux_free_string`.
/// - Returns NULL on error; call `mflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mflux_dashboard(
    input_json: *const c_char,
    now: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(input_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result = resolve_now(now).and_then(|now| crate::dashboard::dashboard_to_json(json_str, now));
    finish(result)
}

// ============================================================================
// Stateful Builder API
// ============================================================================

/// Opaque handle to a DashboardBuilder
pub struct DashboardBuilderHandle {
    builder: DashboardBuilder,
}

/// Create a dashboard builder. A NULL `instance_id` generates a random one.
///
/// # Safety
/// - `instance_id` must be a valid null-terminated C string or NULL.
/// - Must be freed with `mflux_builder_free`.
#[no_mangle]
pub unsafe extern "C" fn mflux_builder_new(instance_id: *const c_char) -> *mut DashboardBuilderHandle {
    clear_last_error();

    let builder = match cstr_to_string(instance_id) {
        Some(id) => DashboardBuilder::with_instance_id(id),
        None => DashboardBuilder::new(),
    };

    Box::into_raw(Box::new(DashboardBuilderHandle { builder }))
}

/// Free a dashboard builder.
///
/// # Safety
/// - `builder` must be a valid pointer returned by `mflux_builder_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mflux_builder_free(builder: *mut DashboardBuilderHandle) {
    if !builder.is_null() {
        drop(Box::from_raw(builder));
    }
}

/// Build a dashboard snapshot with a persistent builder.
///
/// # Safety
/// - `builder` must be a valid pointer returned by `mflux_builder_new`.
/// - `input_json` must be a valid null-terminated C string; `now` may be NULL.
/// - Returns a newly allocated string that must be freed with `mflux_free_string`.
/// - Returns NULL on error; call `mflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mflux_builder_build(
    builder: *const DashboardBuilderHandle,
    input_json: *const c_char,
    now: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if builder.is_null() {
        set_last_error("Null builder pointer");
        return ptr::null_mut();
    }

    let handle = &*builder;

    let json_str = match cstr_to_string(input_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result = resolve_now(now).and_then(|now| {
        let input = DashboardInput::from_json(&json_str)?;
        handle.builder.build_to_json(&input, now)
    });
    finish(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mflux_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Flux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mflux_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Flux library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn mflux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
