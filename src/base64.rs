// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// URL-safe base64 encoding/decoding (RFC 4648 section 5, no padding)
//
// Lengths are computed up front so callers can allocate the output exactly
// once; the 6-bit packing itself is done by the `base64` crate.

use crate::error::{DecodeError, OutputSizeError};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{DecodeSliceError, Engine as _};
use std::str::FromStr;

/// Padding character, only ever accepted on decode
pub const PAD: u8 = b'=';

/// URL-safe alphabet without padding. Decoding ignores the unused low bits of
/// the last symbol instead of rejecting them.
const URL_SAFE_NO_PAD_LAX: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// How decode treats trailing `=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingPolicy {
    /// Any `=` is an invalid byte
    Strict,
    /// Canonical trailing `=` (one or two, completing the last quantum)
    /// are stripped before the length check
    #[default]
    Lenient,
}

impl PaddingPolicy {
    /// Strip padding this policy tolerates. Only canonical padding is removed:
    /// the `=` count must complete the last quantum, otherwise the input is
    /// returned as is and the first `=` is reported as an invalid byte.
    fn unpadded(self, input: &[u8]) -> &[u8] {
        match self {
            PaddingPolicy::Strict => input,
            PaddingPolicy::Lenient => {
                let pads = input.iter().rev().take_while(|&&b| b == PAD).count();
                let body = &input[..input.len() - pads];
                let missing = (4 - body.len() % 4) % 4;
                if pads > 0 && pads == missing && missing <= 2 {
                    body
                } else {
                    input
                }
            }
        }
    }
}

impl FromStr for PaddingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PaddingPolicy::Strict),
            "lenient" => Ok(PaddingPolicy::Lenient),
            other => Err(format!("Unknown padding policy: {}", other)),
        }
    }
}

#[inline]
fn is_url_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Length of the unpadded encoding of `n` bytes, `None` if it overflows `usize`
pub fn encoded_len(n: usize) -> Option<usize> {
    let tail = match n % 3 {
        0 => 0,
        1 => 2,
        _ => 3,
    };
    (n / 3).checked_mul(4)?.checked_add(tail)
}

/// Validate `input` and return the exact number of bytes it decodes to.
///
/// Every byte is checked against the alphabet, so once this succeeds
/// [`decode_into`] cannot fail on content.
pub fn decoded_len(input: &[u8], policy: PaddingPolicy) -> Result<usize, DecodeError> {
    let body = policy.unpadded(input);

    if let Some(offset) = body.iter().position(|&b| !is_url_safe(b)) {
        return Err(DecodeError::InvalidByte {
            offset,
            byte: body[offset],
        });
    }

    let tail = match body.len() % 4 {
        0 => 0,
        2 => 1,
        3 => 2,
        _ => return Err(DecodeError::InvalidLength { len: body.len() }),
    };

    Ok(body.len() / 4 * 3 + tail)
}

/// Encode into `out`, which must be exactly `encoded_len(input.len())` bytes
pub fn encode_into(input: &[u8], out: &mut [u8]) -> Result<usize, OutputSizeError> {
    let expected = encoded_len(input.len()).unwrap_or(usize::MAX);
    let actual = out.len();
    if actual != expected {
        return Err(OutputSizeError { expected, actual });
    }

    URL_SAFE_NO_PAD_LAX
        .encode_slice(input, out)
        .map_err(|_| OutputSizeError { expected, actual })
}

/// Decode into `out`, which must be exactly `decoded_len(input, policy)` bytes
pub fn decode_into(input: &[u8], policy: PaddingPolicy, out: &mut [u8]) -> Result<usize, DecodeError> {
    let expected = decoded_len(input, policy)?;
    let actual = out.len();
    if actual != expected {
        return Err(OutputSizeError { expected, actual }.into());
    }

    let body = policy.unpadded(input);
    URL_SAFE_NO_PAD_LAX
        .decode_slice(body, out)
        .map_err(|e| match e {
            DecodeSliceError::DecodeError(err) => from_engine_error(err, body.len()),
            DecodeSliceError::OutputSliceTooSmall => OutputSizeError { expected, actual }.into(),
        })
}

fn from_engine_error(err: base64::DecodeError, len: usize) -> DecodeError {
    match err {
        base64::DecodeError::InvalidByte(offset, byte)
        | base64::DecodeError::InvalidLastSymbol(offset, byte) => {
            DecodeError::InvalidByte { offset, byte }
        }
        base64::DecodeError::InvalidLength(len) => DecodeError::InvalidLength { len },
        base64::DecodeError::InvalidPadding => DecodeError::InvalidLength { len },
    }
}

/// Encode bytes to URL-safe base64 (no padding)
pub fn encode_url_safe(data: &[u8]) -> String {
    URL_SAFE_NO_PAD_LAX.encode(data)
}

/// Decode URL-safe base64 under the given padding policy
pub fn decode_url_safe(data: &[u8], policy: PaddingPolicy) -> Result<Vec<u8>, DecodeError> {
    let mut out = vec![0u8; decoded_len(data, policy)?];
    decode_into(data, policy, &mut out)?;
    Ok(out)
}
