//! FFI bindings for Shiftlens
//!
//! This module provides C-compatible functions for calling Shiftlens from
//! host applications. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `shiftlens_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::calendar::AnalysisWindow;
use crate::model::ModelBundle;
use crate::pipeline::PerformanceAnalyzer;
use crate::report::ReportBuilder;
use crate::types::{AttendanceRecord, WorkerProfile};

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

/// Parse the worker and attendance JSON arrays a host hands over
fn parse_batch(
    workers_json: &str,
    attendance_json: &str,
) -> Result<(Vec<WorkerProfile>, Vec<AttendanceRecord>), serde_json::Error> {
    let workers: Vec<WorkerProfile> = serde_json::from_str(workers_json)?;
    let attendance: Vec<AttendanceRecord> = serde_json::from_str(attendance_json)?;
    Ok((workers, attendance))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Run one full analysis and return the report JSON.
///
/// # Safety
/// - `workers_json`, `attendance_json`, `model_json`, `start_date`, and
///   `end_date` must be valid null-terminated C strings.
/// - `workers_json` and `attendance_json` hold JSON arrays; `model_json`
///   holds a model bundle; dates are `YYYY-MM-DD`.
/// - Returns a newly allocated string that must be freed with
///   `shiftlens_free_string`.
/// - Returns NULL on error; call `shiftlens_last_error` to get the message.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_analyze(
    workers_json: *const c_char,
    attendance_json: *const c_char,
    model_json: *const c_char,
    start_date: *const c_char,
    end_date: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let workers_str = match cstr_to_string(workers_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid workers JSON string pointer");
            return ptr::null_mut();
        }
    };

    let attendance_str = match cstr_to_string(attendance_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid attendance JSON string pointer");
            return ptr::null_mut();
        }
    };

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let start_str = match cstr_to_string(start_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid start date string pointer");
            return ptr::null_mut();
        }
    };

    let end_str = match cstr_to_string(end_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid end date string pointer");
            return ptr::null_mut();
        }
    };

    let window = match AnalysisWindow::parse(&start_str, &end_str) {
        Ok(w) => w,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let bundle = match ModelBundle::from_json(&model_str) {
        Ok(b) => b,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let (workers, attendance) = match parse_batch(&workers_str, &attendance_str) {
        Ok(parsed) => parsed,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let analyzer = match PerformanceAnalyzer::from_bundle(&bundle) {
        Ok(a) => a,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match analyzer
        .analyze(&workers, &attendance, &window)
        .and_then(|results| {
            ReportBuilder::new()
                .build_json(results, &window)
                .map_err(Into::into)
        }) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Count working days (weekdays) between two dates, inclusive.
///
/// # Safety
/// - `start_date` and `end_date` must be valid null-terminated C strings
///   in `YYYY-MM-DD` form.
/// - Returns the count, or -1 on error; call `shiftlens_last_error` to get
///   the message.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_working_days(
    start_date: *const c_char,
    end_date: *const c_char,
) -> i64 {
    clear_last_error();

    let start_str = match cstr_to_string(start_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid start date string pointer");
            return -1;
        }
    };

    let end_str = match cstr_to_string(end_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid end date string pointer");
            return -1;
        }
    };

    match AnalysisWindow::parse(&start_str, &end_str) {
        Ok(window) => i64::from(window.working_days()),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Stateful Analyzer API
// ============================================================================

/// Opaque handle holding a loaded analyzer for session reuse
pub struct ShiftlensAnalyzerHandle {
    analyzer: PerformanceAnalyzer,
    reporter: ReportBuilder,
}

/// Create an analyzer from model bundle JSON.
///
/// The model is loaded and validated once; the handle serves any number of
/// `shiftlens_analyzer_analyze` calls and releases the model when freed.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `shiftlens_analyzer_free`.
/// - Returns NULL on error; call `shiftlens_last_error` to get the message.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_analyzer_new(
    model_json: *const c_char,
) -> *mut ShiftlensAnalyzerHandle {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let bundle = match ModelBundle::from_json(&model_str) {
        Ok(b) => b,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let analyzer = match PerformanceAnalyzer::from_bundle(&bundle) {
        Ok(a) => a,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let handle = Box::new(ShiftlensAnalyzerHandle {
        analyzer,
        reporter: ReportBuilder::new(),
    });
    Box::into_raw(handle)
}

/// Free an analyzer handle.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `shiftlens_analyzer_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_analyzer_free(analyzer: *mut ShiftlensAnalyzerHandle) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Analyze a batch with a loaded analyzer and return the report JSON.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `shiftlens_analyzer_new`.
/// - `workers_json`, `attendance_json`, `start_date`, and `end_date` must
///   be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with
///   `shiftlens_free_string`.
/// - Returns NULL on error; call `shiftlens_last_error` to get the message.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_analyzer_analyze(
    analyzer: *mut ShiftlensAnalyzerHandle,
    workers_json: *const c_char,
    attendance_json: *const c_char,
    start_date: *const c_char,
    end_date: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if analyzer.is_null() {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    }

    let handle = &*analyzer;

    let workers_str = match cstr_to_string(workers_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid workers JSON string pointer");
            return ptr::null_mut();
        }
    };

    let attendance_str = match cstr_to_string(attendance_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid attendance JSON string pointer");
            return ptr::null_mut();
        }
    };

    let start_str = match cstr_to_string(start_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid start date string pointer");
            return ptr::null_mut();
        }
    };

    let end_str = match cstr_to_string(end_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid end date string pointer");
            return ptr::null_mut();
        }
    };

    let window = match AnalysisWindow::parse(&start_str, &end_str) {
        Ok(w) => w,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let (workers, attendance) = match parse_batch(&workers_str, &attendance_str) {
        Ok(parsed) => parsed,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match handle
        .analyzer
        .analyze(&workers, &attendance, &window)
        .and_then(|results| {
            handle
                .reporter
                .build_json(results, &window)
                .map_err(Into::into)
        }) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Shiftlens functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Shiftlens function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Shiftlens function call
///   on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Shiftlens library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn shiftlens_version() -> *const c_char {
    // Use a static CString to avoid allocation
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_workers_json() -> CString {
        CString::new(
            r#"[
                {"userId": "u1", "name": "Asha", "email": "asha@example.com", "workerId": "W-01", "role": "worker"}
            ]"#,
        )
        .unwrap()
    }

    fn sample_attendance_json() -> CString {
        CString::new(
            r#"[
                {"attendanceId": "a1", "userId": "u1", "date": "2024-01-02", "clockInTime": "2024-01-02T06:30:00", "workMinutes": 480, "status": "approved"},
                {"attendanceId": "a2", "userId": "u1", "date": "2024-01-03", "clockInTime": "2024-01-03T06:45:00", "workMinutes": 480, "status": "approved"}
            ]"#,
        )
        .unwrap()
    }

    fn bundled_model_json() -> CString {
        CString::new(ModelBundle::bundled().to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_ffi_analyze() {
        let workers = sample_workers_json();
        let attendance = sample_attendance_json();
        let model = bundled_model_json();
        let start = CString::new("2024-01-01").unwrap();
        let end = CString::new("2024-01-29").unwrap();

        unsafe {
            let result = shiftlens_analyze(
                workers.as_ptr(),
                attendance.as_ptr(),
                model.as_ptr(),
                start.as_ptr(),
                end.as_ptr(),
            );

            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let report: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(report["results"][0]["userId"], "u1");
            assert!(report["summary"].get("label_counts").is_some());

            shiftlens_free_string(result);
        }
    }

    #[test]
    fn test_ffi_analyzer_lifecycle() {
        unsafe {
            let model = bundled_model_json();
            let analyzer = shiftlens_analyzer_new(model.as_ptr());
            assert!(!analyzer.is_null());

            let workers = sample_workers_json();
            let attendance = sample_attendance_json();
            let start = CString::new("2024-01-01").unwrap();
            let end = CString::new("2024-01-29").unwrap();

            // The same handle serves repeated batches
            for _ in 0..2 {
                let result = shiftlens_analyzer_analyze(
                    analyzer,
                    workers.as_ptr(),
                    attendance.as_ptr(),
                    start.as_ptr(),
                    end.as_ptr(),
                );
                assert!(!result.is_null());
                shiftlens_free_string(result);
            }

            shiftlens_analyzer_free(analyzer);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let bad_model = CString::new("not json").unwrap();
            let analyzer = shiftlens_analyzer_new(bad_model.as_ptr());

            assert!(analyzer.is_null());

            let error = shiftlens_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_working_days() {
        unsafe {
            let start = CString::new("2024-01-01").unwrap();
            let end = CString::new("2024-01-07").unwrap();
            assert_eq!(shiftlens_working_days(start.as_ptr(), end.as_ptr()), 5);

            let bad = CString::new("2024-13-01").unwrap();
            assert_eq!(shiftlens_working_days(bad.as_ptr(), end.as_ptr()), -1);
            assert!(!shiftlens_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = shiftlens_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
