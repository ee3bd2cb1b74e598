// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Host function ABI
// Rust mirrors of the records the host passes to the init/call/deinit entry points

use std::os::raw::{c_char, c_int, c_uint, c_ulong, c_void};
use std::ptr;
use std::slice;

/// Size of the host's diagnostic buffer, terminator included
pub const UDF_MESSAGE_SIZE: usize = 512;

// Result type codes reported in `UdfArgs::arg_type` (the host's Item_result)
pub const STRING_RESULT: c_int = 0;
pub const REAL_RESULT: c_int = 1;
pub const INT_RESULT: c_int = 2;
pub const ROW_RESULT: c_int = 3;
pub const DECIMAL_RESULT: c_int = 4;

/// Charset name the host reports for byte strings
pub const BINARY_CHARSET: &str = "binary";

/// Per-call-site record (matches the host's UDF_INIT layout).
/// `ptr` is ours between init and deinit.
#[repr(C)]
pub struct UdfInit {
    pub maybe_null: c_char,
    pub decimals: c_uint,
    pub max_length: c_ulong,
    pub ptr: *mut c_char,
    pub const_item: c_char,
    pub extension: *mut c_void,
}

impl UdfInit {
    pub const fn empty() -> Self {
        Self {
            maybe_null: 0,
            decimals: 0,
            max_length: 0,
            ptr: ptr::null_mut(),
            const_item: 0,
            extension: ptr::null_mut(),
        }
    }
}

/// Argument list (matches the host's UDF_ARGS layout)
#[repr(C)]
pub struct UdfArgs {
    pub arg_count: c_uint,
    pub arg_type: *mut c_int,
    pub args: *mut *mut c_char,
    pub lengths: *mut c_ulong,
    pub maybe_null: *mut c_char,
    pub attributes: *mut *mut c_char,
    pub attribute_lengths: *mut c_ulong,
    pub extension: *mut c_void,
}

/// Kind of one argument as far as the codec cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Binary,
    Text,
    Other(c_int),
}

impl ArgKind {
    /// Classify a result type code. Only a string in the binary charset is
    /// `Binary`; numbers are converted to their text form by the host once
    /// the argument is coerced to a string.
    pub fn classify(code: c_int, charset: Option<&str>) -> Self {
        match code {
            STRING_RESULT if charset.is_some_and(|c| c.eq_ignore_ascii_case(BINARY_CHARSET)) => {
                ArgKind::Binary
            }
            STRING_RESULT | REAL_RESULT | INT_RESULT | DECIMAL_RESULT => ArgKind::Text,
            other => ArgKind::Other(other),
        }
    }
}

impl UdfArgs {
    pub fn count(&self) -> usize {
        self.arg_count as usize
    }

    /// Result type codes of all arguments, `None` if the host left `arg_type` null
    ///
    /// # Safety
    /// `arg_type` must be null or point to `arg_count` entries.
    pub unsafe fn types(&self) -> Option<&[c_int]> {
        if self.count() == 0 {
            return Some(&[]);
        }
        if self.arg_type.is_null() {
            return None;
        }
        Some(slice::from_raw_parts(self.arg_type, self.count()))
    }

    /// Ask the host to hand argument `index` over as a string
    ///
    /// # Safety
    /// `arg_type` must be null or point to `arg_count` writable entries.
    pub unsafe fn coerce_to_string(&mut self, index: usize) {
        if index < self.count() && !self.arg_type.is_null() {
            *self.arg_type.add(index) = STRING_RESULT;
        }
    }

    /// Borrow the bytes of argument `index`; `None` for SQL NULL or missing arrays.
    ///
    /// # Safety
    /// `args` and `lengths` must be null or point to `arg_count` entries, and each
    /// non-null argument must point to at least its reported length in bytes.
    pub unsafe fn value(&self, index: usize) -> Option<&[u8]> {
        if index >= self.count() || self.args.is_null() || self.lengths.is_null() {
            return None;
        }
        let data = *self.args.add(index);
        if data.is_null() {
            return None;
        }
        let len = *self.lengths.add(index) as usize;
        if len == 0 {
            return Some(&[]);
        }
        Some(slice::from_raw_parts(data as *const u8, len))
    }
}

/// Copy `text` into the host's diagnostic buffer, truncated and NUL-terminated
///
/// # Safety
/// `message` must be null or writable for `UDF_MESSAGE_SIZE` bytes.
pub unsafe fn write_message(message: *mut c_char, text: &str) {
    if message.is_null() {
        return;
    }
    let len = text.len().min(UDF_MESSAGE_SIZE - 1);
    ptr::copy_nonoverlapping(text.as_ptr(), message as *mut u8, len);
    *message.add(len) = 0;
}
