//! C-compatible FFI API for ordering backends written in other languages.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `rforge_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `rforge_free_buffer` / `rforge_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error).
//! - Error details can be retrieved via `rforge_last_error`.
//!
//! | code | meaning |
//! |------|---------|
//! | 1 | null pointer argument |
//! | 2 | input is not valid UTF-8 |
//! | 3 | order JSON could not be parsed |
//! | 4 | render or write failed |
//!
//! ## Thread safety
//! - `rforge_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.
//!
//! ## Usage from Go (cgo)
//! ```go
//! // #cgo LDFLAGS: -lreceipt_forge
//! // #include "receipt_forge.h"
//! import "C"
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::order::Order;
use crate::pipeline::{DocumentKind, ReceiptRenderer};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Decode `len` bytes at `ptr` into an [`Order`], recording failures.
///
/// # Safety
/// `ptr` must point to `len` valid bytes.
unsafe fn order_from_raw(ptr: *const u8, len: u32) -> Result<Order, c_int> {
    let bytes = slice::from_raw_parts(ptr, len as usize);
    let json = std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        2
    })?;
    Order::from_json(json).map_err(|e| {
        set_last_error(&e.to_string());
        3
    })
}

/// # Safety
/// See [`rforge_render_customer_receipt`].
unsafe fn render_to_path(
    kind: DocumentKind,
    order_ptr: *const u8,
    order_len: u32,
    dest: *const c_char,
) -> c_int {
    if order_ptr.is_null() || dest.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }
    let order = match order_from_raw(order_ptr, order_len) {
        Ok(o) => o,
        Err(code) => return code,
    };
    let dest = match CStr::from_ptr(dest).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in path: {e}"));
            return 2;
        }
    };

    match ReceiptRenderer::default().render_to_path(kind, &order, dest) {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            4
        }
    }
}

/// # Safety
/// See [`rforge_customer_receipt_pdf`].
unsafe fn render_to_buffer(
    kind: DocumentKind,
    order_ptr: *const u8,
    order_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if order_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }
    let order = match order_from_raw(order_ptr, order_len) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let renderer = ReceiptRenderer::default();
    let rendered = match kind {
        DocumentKind::CustomerReceipt => renderer.customer_receipt_bytes(&order),
        DocumentKind::KitchenTicket => renderer.kitchen_ticket_bytes(&order),
    };
    match rendered {
        Ok(pdf_bytes) => {
            let len = pdf_bytes.len() as u32;
            let buf = pdf_bytes.into_boxed_slice();
            *out_buf = Box::into_raw(buf) as *mut u8;
            *out_len = len;
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            4
        }
    }
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Render the customer receipt for an order and write it atomically to a file.
///
/// # Parameters
/// - `order_ptr`: pointer to UTF-8 order JSON (not necessarily null-terminated)
/// - `order_len`: length of the JSON in bytes
/// - `dest`: null-terminated UTF-8 destination path
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `rforge_last_error`.
/// A failed call leaves any existing file at `dest` untouched.
///
/// # Safety
/// - `order_ptr` must point to `order_len` valid bytes.
/// - `dest` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn rforge_render_customer_receipt(
    order_ptr: *const u8,
    order_len: u32,
    dest: *const c_char,
) -> c_int {
    render_to_path(DocumentKind::CustomerReceipt, order_ptr, order_len, dest)
}

/// Render the kitchen ticket for an order and write it atomically to a file.
///
/// # Safety
/// Same as `rforge_render_customer_receipt`.
#[no_mangle]
pub unsafe extern "C" fn rforge_render_kitchen_ticket(
    order_ptr: *const u8,
    order_len: u32,
    dest: *const c_char,
) -> c_int {
    render_to_path(DocumentKind::KitchenTicket, order_ptr, order_len, dest)
}

/// Render the customer receipt for an order into a heap buffer.
///
/// # Parameters
/// - `order_ptr`, `order_len`: the order JSON
/// - `out_buf`: on success, receives a pointer to heap-allocated PDF bytes
/// - `out_len`: on success, receives the length of the PDF buffer
///
/// # Safety
/// - `order_ptr` must point to `order_len` valid bytes.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `rforge_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn rforge_customer_receipt_pdf(
    order_ptr: *const u8,
    order_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    render_to_buffer(DocumentKind::CustomerReceipt, order_ptr, order_len, out_buf, out_len)
}

/// Render the kitchen ticket for an order into a heap buffer.
///
/// # Safety
/// Same as `rforge_customer_receipt_pdf`.
#[no_mangle]
pub unsafe extern "C" fn rforge_kitchen_ticket_pdf(
    order_ptr: *const u8,
    order_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    render_to_buffer(DocumentKind::KitchenTicket, order_ptr, order_len, out_buf, out_len)
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `rforge_*_pdf`.
///
/// # Safety
/// `buf` must have been returned by a previous `rforge_*_pdf` call, and `len`
/// must be the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn rforge_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string allocated by this library.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn rforge_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next failing `rforge_*` call on the
/// same thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn rforge_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn rforge_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &[u8] = br#"{"order_number": "LF-9", "customer_name": "Ana",
        "items": [{"name": "Garlic Bread", "price": 5.99}],
        "subtotal": 5.99, "total": 5.99, "payment_method": "cash"}"#;

    fn last_error() -> String {
        let p = rforge_last_error();
        assert!(!p.is_null());
        unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
    }

    #[test]
    fn ffi_customer_receipt_pdf() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rforge_customer_receipt_pdf(ORDER.as_ptr(), ORDER.len() as u32, &mut out_buf, &mut out_len)
        };

        assert_eq!(rc, 0, "Expected success");
        assert!(!out_buf.is_null());
        assert!(out_len > 100);

        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");

        unsafe { rforge_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_kitchen_ticket_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ticket.pdf");
        let dest_c = CString::new(dest.to_str().unwrap()).unwrap();

        let rc = unsafe {
            rforge_render_kitchen_ticket(ORDER.as_ptr(), ORDER.len() as u32, dest_c.as_ptr())
        };

        assert_eq!(rc, 0);
        let bytes = std::fs::read(&dest).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn ffi_null_input() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe { rforge_kitchen_ticket_pdf(ptr::null(), 0, &mut out_buf, &mut out_len) };

        assert_eq!(rc, 1, "Should fail on null input");
        assert_eq!(last_error(), "Null pointer argument");
    }

    #[test]
    fn ffi_bad_json_reports_error() {
        let json = b"{not json";
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            rforge_customer_receipt_pdf(json.as_ptr(), json.len() as u32, &mut out_buf, &mut out_len)
        };

        assert_eq!(rc, 3);
        assert!(out_buf.is_null());
        assert!(last_error().starts_with("invalid order JSON"));
    }

    #[test]
    fn ffi_failed_write_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("receipt.pdf");
        std::fs::write(&existing, b"previous").unwrap();
        let bad = CString::new(existing.join("nested.pdf").to_str().unwrap()).unwrap();

        let rc = unsafe {
            rforge_render_customer_receipt(ORDER.as_ptr(), ORDER.len() as u32, bad.as_ptr())
        };

        assert_eq!(rc, 4);
        assert_eq!(std::fs::read(&existing).unwrap(), b"previous");
    }

    #[test]
    fn ffi_version() {
        let v = rforge_version();
        let version = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }
}
