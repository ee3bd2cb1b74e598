// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Argument validation, run once per call site at setup

use crate::error::SetupError;
use crate::udf_abi::ArgKind;

/// Direction of the codec, fixed for a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

/// Check arity and kind, and derive the mode the call site will run in.
///
/// Binary arguments are encoded, text arguments are decoded.
pub fn validate(kinds: &[ArgKind]) -> Result<Mode, SetupError> {
    log::trace!("validate kinds={:?}", kinds);

    let kind = match kinds {
        [kind] => *kind,
        _ => return Err(SetupError::ArgumentCount(kinds.len())),
    };

    let mode = match kind {
        ArgKind::Binary => Mode::Encode,
        ArgKind::Text => Mode::Decode,
        ArgKind::Other(code) => return Err(SetupError::UnsupportedKind(code)),
    };

    log::debug!("validate -> {:?}", mode);
    Ok(mode)
}
