// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `b64u`: URL-safe base64 for SQL hosts
//!
//! A loadable function that encodes binary strings to base64url (RFC 4648
//! section 5, no padding) and decodes base64url text back to bytes. The host
//! binds the three entry points below by name:
//!
//! ```sql
//! create function `b64u` returns string soname 'libb64u.so';
//! select `b64u`('eWVldA');                 -- yeet
//! select `b64u`(cast('yeet' as binary));  -- eWVldA
//! ```
//!
//! Strings in the `binary` charset are encoded; any other argument is
//! rendered as text by the host and decoded.

mod base64;
mod buffer;
mod config;
mod context;
mod error;
mod lifecycle;
mod logging;
mod udf_abi;
mod udf_metadata;
mod validator;

#[cfg(test)]
mod tests_negative;

pub use crate::base64::*;
pub use buffer::OutputBuffer;
pub use config::*;
pub use context::InvocationContext;
pub use error::*;
pub use logging::init_logging;
pub use udf_abi::*;
pub use udf_metadata::{ArgumentCharsets, UdfMetadata};
pub use validator::{validate, Mode};

use std::os::raw::{c_char, c_ulong};

/// Setup. Returns 0 when the call site is ready, 1 with `message` filled otherwise.
#[no_mangle]
pub unsafe extern "C" fn b64u_init(
    initid: *mut UdfInit,
    args: *mut UdfArgs,
    message: *mut c_char,
) -> c_char {
    init_logging();
    log::trace!("b64u_init initid={:p} args={:p} message={:p}", initid, args, message);

    let metadata = UdfMetadata::acquire();
    init_with(initid, args, message, &metadata)
}

/// Setup against an explicit charset source
pub(crate) unsafe fn init_with(
    initid: *mut UdfInit,
    args: *mut UdfArgs,
    message: *mut c_char,
    charsets: &dyn ArgumentCharsets,
) -> c_char {
    let config = Config::from_env();
    let result = match initid.as_mut() {
        Some(init) => lifecycle::setup(init, args.as_mut(), &config, charsets),
        None => Err(SetupError::MissingRecord("init")),
    };

    match result {
        Ok(()) => {
            log::debug!("b64u_init -> 0");
            0
        }
        Err(e) => {
            log::warn!("b64u_init rejected call site: {}", e);
            udf_abi::write_message(message, &e.to_string());
            log::debug!("b64u_init -> 1");
            1
        }
    }
}

/// Invoke. On success returns a `malloc`-family buffer of `*length` bytes which
/// the host releases with `free()`; the host's `result` scratch buffer is not
/// used. Malformed input gives `*is_null = 1`; internal failures additionally
/// set `*error = 1`.
#[no_mangle]
pub unsafe extern "C" fn b64u(
    initid: *mut UdfInit,
    args: *mut UdfArgs,
    _result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_char,
    error: *mut c_char,
) -> *mut c_char {
    trace_opt!("b64u initid={:p} args={:p}", initid, args);

    let result = match (initid.as_ref(), args.as_ref()) {
        (Some(init), Some(args)) => lifecycle::invoke(init, args),
        (None, _) => Err(InvokeError::MissingContext),
        (Some(_), None) => Err(InvokeError::ArgumentCount(0)),
    };

    let (out, len, null, failed) = match result {
        Ok(Some(buf)) => {
            let (ptr, len) = buf.into_raw();
            (ptr, len, 0, 0)
        }
        Ok(None) => (std::ptr::null_mut(), 0, 1, 0),
        Err(e) if e.is_null_result() => {
            log::debug!("b64u: {}", e);
            (std::ptr::null_mut(), 0, 1, 0)
        }
        Err(e) => {
            log::error!("b64u failed: {}", e);
            (std::ptr::null_mut(), 0, 1, 1)
        }
    };

    if !length.is_null() {
        *length = len as c_ulong;
    }
    if !is_null.is_null() {
        *is_null = null;
    }
    if !error.is_null() {
        *error = failed;
    }

    debug_opt!("b64u -> {:p} len={} is_null={} error={}", out, len, null, failed);
    out
}

/// Teardown. Releases the call site's context; safe to call after a failed setup.
#[no_mangle]
pub unsafe extern "C" fn b64u_deinit(initid: *mut UdfInit) {
    log::trace!("b64u_deinit initid={:p}", initid);

    if let Some(init) = initid.as_mut() {
        lifecycle::teardown(init);
    }

    log::debug!("b64u_deinit complete");
}
