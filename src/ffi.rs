//! FFI bindings for the Moodlens engine
//!
//! C-compatible functions for calling the engine from the desktop shell.
//! All functions use null-terminated C strings and return allocated memory
//! that must be freed by the caller using `moodlens_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::dashboard::{build_dashboard, Snapshot};
use crate::instruments::{InstrumentCatalog, InstrumentId};
use crate::report::ReportEncoder;
use crate::scorer::AssessmentScorer;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// Score an instrument from a JSON array of item responses.
///
/// # Safety
/// - `instrument` and `responses_json` must be valid null-terminated C
///   strings; `responses_json` holds a JSON array of integers.
/// - Returns a newly allocated JSON string that must be freed with
///   `moodlens_free_string`.
/// - Returns NULL on error; call `moodlens_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn moodlens_score_assessment(
    instrument: *const c_char,
    responses_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let instrument_str = match cstr_to_string(instrument) {
        Some(s) => s,
        None => {
            set_last_error("Invalid instrument string pointer");
            return ptr::null_mut();
        }
    };

    let responses_str = match cstr_to_string(responses_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid responses string pointer");
            return ptr::null_mut();
        }
    };

    let result = (|| {
        let id = InstrumentId::from_str(&instrument_str)?;
        let responses: Vec<u32> = serde_json::from_str(&responses_str)?;
        let catalog = InstrumentCatalog::builtin();
        let def = catalog
            .get(id)
            .ok_or_else(|| crate::EngineError::UnknownInstrument(instrument_str.clone()))?;
        let score = AssessmentScorer::score(def, &responses)?;
        Ok::<String, crate::EngineError>(serde_json::to_string(&score)?)
    })();

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Build a dashboard report from a snapshot JSON document.
///
/// # Safety
/// - `snapshot_json` and `as_of_rfc3339` must be valid null-terminated C
///   strings; `as_of_rfc3339` holds an RFC 3339 timestamp.
/// - Returns a newly allocated JSON string that must be freed with
///   `moodlens_free_string`.
/// - Returns NULL on error; call `moodlens_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn moodlens_build_report(
    snapshot_json: *const c_char,
    as_of_rfc3339: *const c_char,
    window_days: u32,
) -> *mut c_char {
    clear_last_error();

    let snapshot_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return ptr::null_mut();
        }
    };

    let as_of_str = match cstr_to_string(as_of_rfc3339) {
        Some(s) => s,
        None => {
            set_last_error("Invalid as_of string pointer");
            return ptr::null_mut();
        }
    };

    let as_of = match DateTime::parse_from_rfc3339(&as_of_str) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            set_last_error(&format!("Invalid as_of timestamp: {e}"));
            return ptr::null_mut();
        }
    };

    let result = (|| {
        let snapshot: Snapshot = serde_json::from_str(&snapshot_str)?;
        let dashboard = build_dashboard(&snapshot, as_of, window_days)?;
        ReportEncoder::new().encode_to_json(dashboard)
    })();

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `moodlens_free_string`, or NULL when no error is recorded.
#[no_mangle]
pub unsafe extern "C" fn moodlens_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(msg) => string_to_cstr(msg.to_str().unwrap_or("Unknown error")),
        None => ptr::null_mut(),
    })
}

/// Get the engine version.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `moodlens_free_string`.
#[no_mangle]
pub unsafe extern "C" fn moodlens_version() -> *mut c_char {
    string_to_cstr(crate::ENGINE_VERSION)
}

/// Free a string returned by any moodlens function.
///
/// # Safety
/// - `s` must be a pointer returned by a moodlens function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn moodlens_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_ffi_score_assessment() {
        let instrument = CString::new("phq9").unwrap();
        let responses = CString::new("[1,2,0,3,1,1,2,0,2]").unwrap();

        unsafe {
            let result = moodlens_score_assessment(instrument.as_ptr(), responses.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["total"], 12);
            assert_eq!(value["band"]["severity"], "moderate");

            moodlens_free_string(result);
        }
    }

    #[test]
    fn test_ffi_score_error_sets_last_error() {
        let instrument = CString::new("phq9").unwrap();
        let responses = CString::new("[1,2]").unwrap();

        unsafe {
            let result = moodlens_score_assessment(instrument.as_ptr(), responses.as_ptr());
            assert!(result.is_null());

            let error = moodlens_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("expected 9"));
            moodlens_free_string(error);
        }
    }

    #[test]
    fn test_ffi_build_report_empty_snapshot() {
        let snapshot = CString::new("{}").unwrap();
        let as_of = CString::new("2024-03-15T00:00:00Z").unwrap();

        unsafe {
            let result = moodlens_build_report(snapshot.as_ptr(), as_of.as_ptr(), 14);
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("report_version"));

            moodlens_free_string(result);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = moodlens_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
            moodlens_free_string(version);
        }
    }
}
