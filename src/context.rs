// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Per-call-site state created by setup and released by teardown

use crate::base64::PaddingPolicy;
use crate::validator::Mode;

/// Immutable once built, so concurrent invocations may share it freely
#[derive(Debug, PartialEq, Eq)]
pub struct InvocationContext {
    mode: Mode,
    padding: PaddingPolicy,
}

impl InvocationContext {
    pub fn new(mode: Mode, padding: PaddingPolicy) -> Self {
        log::trace!("invocation_context_new mode={:?} padding={:?}", mode, padding);
        Self { mode, padding }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn padding(&self) -> PaddingPolicy {
        self.padding
    }
}

impl Drop for InvocationContext {
    fn drop(&mut self) {
        log::trace!("invocation_context_free mode={:?}", self.mode);
    }
}
