//! C FFI bindings for anti-captcha.
//!
//! Provides a simple blocking API for solving captchas from C, Python, Go, etc.
//! A `timeout_secs` of 0 means no deadline.
//!
//! # Example (C)
//!
//! ```c
//! #include "anticaptcha.h"
//!
//! int main() {
//!     AntiCaptchaResult r = anticaptcha_solve_recaptcha_v2("key", "https://x.test", "site", 120);
//!     if (r.error_code == 0) {
//!         printf("Token: %s\n", r.text);
//!     }
//!     anticaptcha_free_result(r);
//!     return 0;
//! }
//! ```

use std::ffi::{c_char, CStr, CString};
use std::future::Future;
use std::ptr;
use std::time::Duration;

use crate::{AntiCaptcha, AntiCaptchaError, Solution, TaskDescriptor, Timeout};

pub const ERR_INVALID_ARGUMENT: i32 = 1;
pub const ERR_RUNTIME: i32 = 2;
pub const ERR_TRANSPORT: i32 = 3;
pub const ERR_PROTOCOL: i32 = 4;
pub const ERR_API: i32 = 5;
pub const ERR_MALFORMED_RESULT: i32 = 6;
pub const ERR_TIMED_OUT: i32 = 7;
pub const ERR_CANCELLED: i32 = 8;

/// Result structure returned by solve functions.
///
/// All string fields are heap-allocated and must be freed with `anticaptcha_free_result`.
#[repr(C)]
pub struct AntiCaptchaResult {
    /// 0 = success, non-zero = error
    pub error_code: i32,
    /// Error message if error_code != 0, NULL otherwise
    pub error_message: *mut c_char,
    /// reCAPTCHA token or image text
    pub text: *mut c_char,
    /// GeeTest challenge
    pub challenge: *mut c_char,
    /// GeeTest validate
    pub validate: *mut c_char,
    /// GeeTest seccode
    pub seccode: *mut c_char,
}

impl AntiCaptchaResult {
    fn empty(error_code: i32) -> Self {
        Self {
            error_code,
            error_message: ptr::null_mut(),
            text: ptr::null_mut(),
            challenge: ptr::null_mut(),
            validate: ptr::null_mut(),
            seccode: ptr::null_mut(),
        }
    }

    fn success(solution: Solution) -> Self {
        let mut result = Self::empty(0);
        match solution {
            Solution::RecaptchaToken { token } => result.text = string_to_ptr(token),
            Solution::ImageText { text } => result.text = string_to_ptr(text),
            Solution::GeeTest(s) => {
                result.challenge = string_to_ptr(s.challenge);
                result.validate = string_to_ptr(s.validate);
                result.seccode = string_to_ptr(s.seccode);
            }
        }
        result
    }

    fn error(code: i32, message: String) -> Self {
        let mut result = Self::empty(code);
        result.error_message = string_to_ptr(message);
        result
    }
}

/// Map an error onto its stable FFI error code.
fn error_code(err: &AntiCaptchaError) -> i32 {
    match err {
        AntiCaptchaError::InvalidInput(_) | AntiCaptchaError::MissingCredential(_) => {
            ERR_INVALID_ARGUMENT
        }
        AntiCaptchaError::Http(_) | AntiCaptchaError::Transport(_) | AntiCaptchaError::Json(_) => {
            ERR_TRANSPORT
        }
        AntiCaptchaError::Protocol(_) => ERR_PROTOCOL,
        AntiCaptchaError::Api { .. } => ERR_API,
        AntiCaptchaError::MalformedResult { .. } => ERR_MALFORMED_RESULT,
        AntiCaptchaError::TimedOut { .. } => ERR_TIMED_OUT,
        AntiCaptchaError::Cancelled { .. } => ERR_CANCELLED,
    }
}

/// Convert Rust String to C string pointer.
fn string_to_ptr(s: String) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Convert C string to Rust String, returns None if null or invalid UTF-8.
unsafe fn ptr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn timeout_from_secs(timeout_secs: u64) -> Timeout {
    if timeout_secs == 0 {
        Timeout::Never
    } else {
        Timeout::After(Duration::from_secs(timeout_secs))
    }
}

/// Run `solve` against a fresh client on a private current-thread runtime.
fn block_on_solve<F, Fut>(client_key: String, solve: F) -> Result<Solution, (i32, String)>
where
    F: FnOnce(AntiCaptcha) -> Fut,
    Fut: Future<Output = crate::Result<Solution>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| (ERR_RUNTIME, format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let client = AntiCaptcha::new(client_key)
            .map_err(|e| (error_code(&e), format!("Failed to build client: {}", e)))?;
        solve(client)
            .await
            .map_err(|e| (error_code(&e), format!("Solve failed: {}", e)))
    })
}

/// Shared tail of the per-variant entry points; `client_key` is already
/// read out of its C string.
fn solve_task(client_key: Option<String>, task: crate::Result<TaskDescriptor>, timeout_secs: u64) -> AntiCaptchaResult {
    let client_key = match client_key {
        Some(s) if !s.is_empty() => s,
        _ => return AntiCaptchaResult::error(ERR_INVALID_ARGUMENT, "client_key is required".into()),
    };
    let task = match task {
        Ok(task) => task,
        Err(e) => return AntiCaptchaResult::error(error_code(&e), e.to_string()),
    };
    let timeout = timeout_from_secs(timeout_secs);

    match block_on_solve(client_key, |client| async move { client.solve(task, timeout).await }) {
        Ok(solution) => AntiCaptchaResult::success(solution),
        Err((code, message)) => AntiCaptchaResult::error(code, message),
    }
}

/// Read a required string argument into `Err(InvalidInput)` when absent.
unsafe fn required_arg(ptr: *const c_char, name: &str) -> crate::Result<String> {
    ptr_to_string(ptr).ok_or_else(|| AntiCaptchaError::InvalidInput(format!("{} is required", name)))
}

/// Solve a reCAPTCHA v2 (blocking). The token is returned in `text`.
///
/// # Safety
///
/// All pointers must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_solve_recaptcha_v2(
    client_key: *const c_char,
    website_url: *const c_char,
    website_key: *const c_char,
    timeout_secs: u64,
) -> AntiCaptchaResult {
    let task = required_arg(website_url, "website_url").and_then(|url| {
        TaskDescriptor::recaptcha_v2(url, required_arg(website_key, "website_key")?)
    });
    solve_task(ptr_to_string(client_key), task, timeout_secs)
}

/// Solve a reCAPTCHA v3 (blocking). The token is returned in `text`.
///
/// # Safety
///
/// All pointers must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_solve_recaptcha_v3(
    client_key: *const c_char,
    website_url: *const c_char,
    website_key: *const c_char,
    min_score: f64,
    page_action: *const c_char,
    timeout_secs: u64,
) -> AntiCaptchaResult {
    let task = required_arg(website_url, "website_url").and_then(|url| {
        TaskDescriptor::recaptcha_v3(
            url,
            required_arg(website_key, "website_key")?,
            min_score,
            required_arg(page_action, "page_action")?,
        )
    });
    solve_task(ptr_to_string(client_key), task, timeout_secs)
}

/// Solve a GeeTest captcha (blocking). The solution is returned in
/// `challenge`, `validate` and `seccode`.
///
/// # Safety
///
/// - `client_key`, `website_url`, `gt` and `challenge` must be valid null-terminated C strings
/// - `api_server_subdomain` must be NULL or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_solve_geetest(
    client_key: *const c_char,
    website_url: *const c_char,
    gt: *const c_char,
    challenge: *const c_char,
    api_server_subdomain: *const c_char,
    timeout_secs: u64,
) -> AntiCaptchaResult {
    let task = required_arg(website_url, "website_url").and_then(|url| {
        TaskDescriptor::geetest(
            url,
            required_arg(gt, "gt")?,
            required_arg(challenge, "challenge")?,
            ptr_to_string(api_server_subdomain).unwrap_or_default(),
        )
    });
    solve_task(ptr_to_string(client_key), task, timeout_secs)
}

/// Solve an image captcha given as base64 (blocking). The text is returned in `text`.
///
/// # Safety
///
/// All pointers must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_solve_image(
    client_key: *const c_char,
    base64_image: *const c_char,
    timeout_secs: u64,
) -> AntiCaptchaResult {
    let task = required_arg(base64_image, "base64_image").and_then(|body| TaskDescriptor::image(body));
    solve_task(ptr_to_string(client_key), task, timeout_secs)
}

/// Solve any task described as anti-captcha task JSON and return JSON (blocking).
///
/// `task_json` is the `task` object of a `createTask` request, e.g.
/// `{"type": "ImageToTextTask", "body": "..."}`.
///
/// # Returns
///
/// A JSON string on success:
/// ```json
/// {"success": true, "solution": {"kind": "image_text", "text": "..."}}
/// ```
///
/// Or on error:
/// ```json
/// {"success": false, "error_code": 7, "error": "error message"}
/// ```
///
/// The caller must free the string with `anticaptcha_free_string`.
///
/// # Safety
///
/// All pointers must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_solve_json(
    client_key: *const c_char,
    task_json: *const c_char,
    timeout_secs: u64,
) -> *mut c_char {
    let task = required_arg(task_json, "task_json").and_then(|json| {
        serde_json::from_str::<TaskDescriptor>(&json)
            .map_err(|e| AntiCaptchaError::InvalidInput(format!("invalid task JSON: {}", e)))
    });

    let outcome = match ptr_to_string(client_key) {
        Some(key) if !key.is_empty() => match task {
            Ok(task) => {
                let timeout = timeout_from_secs(timeout_secs);
                block_on_solve(key, |client| async move { client.solve(task, timeout).await })
            }
            Err(e) => Err((error_code(&e), e.to_string())),
        },
        _ => Err((ERR_INVALID_ARGUMENT, "client_key is required".to_string())),
    };

    let json = match outcome {
        Ok(solution) => serde_json::json!({ "success": true, "solution": solution }),
        Err((code, error)) => serde_json::json!({
            "success": false,
            "error_code": code,
            "error": error
        }),
    };

    string_to_ptr(json.to_string())
}

/// Free an AntiCaptchaResult structure.
///
/// # Safety
///
/// - `result` must be a valid AntiCaptchaResult previously returned by this library
/// - Each result must only be freed once
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_free_result(result: AntiCaptchaResult) {
    for field in [
        result.error_message,
        result.text,
        result.challenge,
        result.validate,
        result.seccode,
    ] {
        if !field.is_null() {
            let _ = CString::from_raw(field);
        }
    }
}

/// Free a string returned by anti-captcha FFI functions.
///
/// # Safety
///
/// - `s` must be NULL or a valid pointer previously returned by this library
/// - Each string must only be freed once
#[no_mangle]
pub unsafe extern "C" fn anticaptcha_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Get the library version.
///
/// # Returns
///
/// A static string with the version number. Do NOT free this string.
#[no_mangle]
pub extern "C" fn anticaptcha_version() -> *const c_char {
    // This is a static string, no need to free
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_client_key() {
        let url = CString::new("https://x.test").unwrap();
        let key = CString::new("site").unwrap();
        let result =
            unsafe { anticaptcha_solve_recaptcha_v2(ptr::null(), url.as_ptr(), key.as_ptr(), 10) };
        assert_eq!(result.error_code, ERR_INVALID_ARGUMENT);
        let message = unsafe { ptr_to_string(result.error_message) }.unwrap();
        assert!(message.contains("client_key"));
        unsafe { anticaptcha_free_result(result) };
    }

    #[test]
    fn test_blank_client_key_is_rejected_before_solving() {
        let task = TaskDescriptor::image("aGk=");
        let result = solve_task(Some(String::new()), task, 10);
        assert_eq!(result.error_code, ERR_INVALID_ARGUMENT);
        unsafe { anticaptcha_free_result(result) };

        let result = solve_task(None, Err(AntiCaptchaError::InvalidInput("x".into())), 10);
        assert_eq!(result.error_code, ERR_INVALID_ARGUMENT);
        let message = unsafe { ptr_to_string(result.error_message) }.unwrap();
        assert!(message.contains("client_key"));
        unsafe { anticaptcha_free_result(result) };
    }

    #[test]
    fn test_invalid_task_json() {
        let client_key = CString::new("k").unwrap();
        let task = CString::new(r#"{"type": "UnknownTask"}"#).unwrap();
        let raw = unsafe { anticaptcha_solve_json(client_key.as_ptr(), task.as_ptr(), 0) };
        let json: serde_json::Value =
            serde_json::from_str(&unsafe { ptr_to_string(raw) }.unwrap()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], ERR_INVALID_ARGUMENT);
        unsafe { anticaptcha_free_string(raw) };
    }

    #[test]
    fn test_timeout_zero_means_never() {
        assert_eq!(timeout_from_secs(0), Timeout::Never);
        assert_eq!(timeout_from_secs(5), Timeout::After(Duration::from_secs(5)));
    }

    #[test]
    fn test_version_is_nul_terminated() {
        let version = unsafe { CStr::from_ptr(anticaptcha_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
