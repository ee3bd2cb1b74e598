// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Call-site lifecycle: setup, invoke, teardown
//
// UNINITIALIZED --setup--> READY --invoke--> READY --teardown--> TERMINATED.
// A failed setup leaves no context behind, so invoke has nothing to run with.

use crate::base64::{decode_into, decoded_len, encode_into, encoded_len};
use crate::buffer::OutputBuffer;
use crate::config::Config;
use crate::context::InvocationContext;
use crate::error::{InvokeError, SetupError};
use crate::udf_abi::{ArgKind, UdfArgs, UdfInit, STRING_RESULT};
use crate::udf_metadata::ArgumentCharsets;
use crate::validator::{validate, Mode};
use crate::{debug_opt, trace_opt};
use std::ptr;

/// Validate the arguments and park a new context in `init.ptr`.
///
/// String arguments in the binary charset select encode, everything else
/// the host can render as a string selects decode. The argument is then
/// coerced to a string so the host never hands over a raw number.
///
/// # Safety
/// `args` must describe valid host arrays (see [`UdfArgs::types`]).
pub unsafe fn setup(
    init: &mut UdfInit,
    args: Option<&mut UdfArgs>,
    config: &Config,
    charsets: &dyn ArgumentCharsets,
) -> Result<(), SetupError> {
    let args = args.ok_or(SetupError::MissingRecord("argument"))?;
    let kinds = classify(args, charsets)?;
    let mode = validate(&kinds)?;
    args.coerce_to_string(0);

    let ctx = Box::new(InvocationContext::new(mode, config.padding));
    init.ptr = Box::into_raw(ctx) as *mut _;
    // malformed input to decode comes back as NULL
    init.maybe_null = 1;
    init.const_item = 0;

    log::debug!("setup -> {:?} (ctx={:p})", mode, init.ptr);
    Ok(())
}

unsafe fn classify(
    args: &UdfArgs,
    charsets: &dyn ArgumentCharsets,
) -> Result<Vec<ArgKind>, SetupError> {
    let types = args
        .types()
        .ok_or(SetupError::MissingRecord("argument type"))?;
    let mut kinds = Vec::with_capacity(types.len());
    for (index, &code) in types.iter().enumerate() {
        let charset = match code {
            STRING_RESULT => charsets.charset(args, index),
            _ => None,
        };
        kinds.push(ArgKind::classify(code, charset.as_deref()));
    }
    Ok(kinds)
}

/// Context stored by a successful [`setup`], if any
///
/// # Safety
/// `init.ptr` must be null or a pointer produced by [`setup`].
pub unsafe fn context(init: &UdfInit) -> Option<&InvocationContext> {
    (init.ptr as *const InvocationContext).as_ref()
}

/// Run one call. `Ok(None)` means the argument was SQL NULL.
///
/// # Safety
/// `init` must have gone through [`setup`]; `args` must describe valid host arrays
/// (see [`UdfArgs::value`]).
pub unsafe fn invoke(init: &UdfInit, args: &UdfArgs) -> Result<Option<OutputBuffer>, InvokeError> {
    let ctx = context(init).ok_or(InvokeError::MissingContext)?;

    if args.count() != 1 {
        return Err(InvokeError::ArgumentCount(args.count()));
    }

    match args.value(0) {
        Some(input) => run(ctx, input).map(Some),
        None => {
            trace_opt!("invoke: NULL argument");
            Ok(None)
        }
    }
}

/// Transform `input` per the context's mode into an exactly sized buffer.
/// Nothing is allocated for input that fails validation.
pub fn run(ctx: &InvocationContext, input: &[u8]) -> Result<OutputBuffer, InvokeError> {
    let out = match ctx.mode() {
        Mode::Encode => {
            let len = encoded_len(input.len()).ok_or(InvokeError::TooLarge { len: input.len() })?;
            let mut out = OutputBuffer::alloc(len)?;
            encode_into(input, out.as_mut_slice())?;
            out
        }
        Mode::Decode => {
            let len = decoded_len(input, ctx.padding())?;
            let mut out = OutputBuffer::alloc(len)?;
            decode_into(input, ctx.padding(), out.as_mut_slice())?;
            out
        }
    };

    debug_opt!("run {:?}: {} -> {} bytes", ctx.mode(), input.len(), out.len());
    Ok(out)
}

/// Release the context. Buffers already returned belong to the host and are not touched.
///
/// # Safety
/// `init.ptr` must be null or a pointer produced by [`setup`] that has not been released.
pub unsafe fn teardown(init: &mut UdfInit) {
    if init.ptr.is_null() {
        return;
    }
    drop(Box::from_raw(init.ptr as *mut InvocationContext));
    init.ptr = ptr::null_mut();
}
