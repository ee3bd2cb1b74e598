// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Error types for setup, invocation and decoding

use std::os::raw::c_int;
use thiserror::Error;

/// Configuration errors detected once, at setup.
///
/// The `Display` text is what the host shows its caller, so it stays short.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("`b64u` requires 1 parameter: the string to be encoded or decoded (got {0})")]
    ArgumentCount(usize),

    #[error("`b64u` requires a binary string (to encode) or a text string (to decode), got result type {0}")]
    UnsupportedKind(c_int),

    #[error("`b64u` setup received a null {0} record")]
    MissingRecord(&'static str),
}

/// Decode failures. These are an ordinary outcome for malformed input
/// and end up as a NULL result, never as a fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid base64url length {len}: a length of 1 mod 4 cannot be decoded")]
    InvalidLength { len: usize },

    #[error("invalid base64url byte 0x{byte:02x} at offset {offset}")]
    InvalidByte { offset: usize, byte: u8 },

    #[error(transparent)]
    OutputSize(#[from] OutputSizeError),
}

/// A caller-provided output slice did not have the exact computed length.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("output buffer holds {actual} bytes but exactly {expected} are required")]
pub struct OutputSizeError {
    pub expected: usize,
    pub actual: usize,
}

/// Per-call failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvokeError {
    #[error("expected 1 argument per call, got {0}")]
    ArgumentCount(usize),

    #[error("invoked without a context from a successful setup")]
    MissingContext,

    #[error("input of {len} bytes is too large to encode")]
    TooLarge { len: usize },

    #[error("failed to allocate a {len} byte output buffer")]
    Allocation { len: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    OutputSize(#[from] OutputSizeError),
}

impl InvokeError {
    /// Malformed input yields a NULL value; everything else raises the host's error flag.
    pub fn is_null_result(&self) -> bool {
        matches!(
            self,
            InvokeError::Decode(DecodeError::InvalidLength { .. } | DecodeError::InvalidByte { .. })
        )
    }
}
