// C entry points for hosts that render the form themselves.
// Strings cross the boundary as JSON and must be released with
// metastasis_form_free_string.
use crate::core::presenter::format_probability;
use crate::core::resolver::resolve;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Resolves one field to its control spec, returned as JSON.
/// Returns null if either argument is null or not UTF-8.
#[no_mangle]
pub extern "C" fn metastasis_form_resolve(
    field: *const c_char,
    description: *const c_char,
) -> *mut c_char {
    if field.is_null() || description.is_null() {
        return ptr::null_mut();
    }
    let field = unsafe { CStr::from_ptr(field) }.to_str();
    let description = unsafe { CStr::from_ptr(description) }.to_str();
    let (Ok(field), Ok(description)) = (field, description) else {
        return ptr::null_mut();
    };
    let result = catch_unwind(AssertUnwindSafe(|| {
        serde_json::to_string(&resolve(field, description)).ok()
    }));
    match result {
        Ok(Some(json)) => into_c_string(json),
        Ok(None) => ptr::null_mut(),
        Err(_) => {
            log::error!("panic while resolving '{field}'");
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn metastasis_form_format_probability(probability: f64) -> *mut c_char {
    into_c_string(format_probability(probability))
}

#[no_mangle]
pub extern "C" fn metastasis_form_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let out = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string();
        metastasis_form_free_string(s);
        out
    }

    #[test]
    fn resolve_returns_json() {
        let field = CString::new("age").unwrap();
        let description = CString::new("Age (number)").unwrap();
        let json = take(metastasis_form_resolve(field.as_ptr(), description.as_ptr()));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "numeric_range");
        assert_eq!(value["bounds"]["max"], 120.0);
    }

    #[test]
    fn null_arguments_yield_null() {
        let field = CString::new("age").unwrap();
        assert!(metastasis_form_resolve(field.as_ptr(), ptr::null()).is_null());
        assert!(metastasis_form_resolve(ptr::null(), field.as_ptr()).is_null());
        metastasis_form_free_string(ptr::null_mut());
    }

    #[test]
    fn formats_probability() {
        assert_eq!(take(metastasis_form_format_probability(0.823)), "82.3%");
    }
}
