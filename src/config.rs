// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Environment-driven configuration, read at setup

use crate::base64::PaddingPolicy;

/// Decode padding policy: `strict` or `lenient`
pub const DECODE_PADDING_ENV: &str = "B64U_DECODE_PADDING";
/// Append logs to this file instead of stderr (read by `init_logging`)
pub const LOG_FILE_ENV: &str = "B64U_LOG_FILE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub padding: PaddingPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Bad values are logged and
    /// replaced by their defaults rather than failing setup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let padding = match lookup(DECODE_PADDING_ENV) {
            Some(value) if !value.trim().is_empty() => match value.parse::<PaddingPolicy>() {
                Ok(policy) => {
                    log::debug!("{} set to {:?} via environment", DECODE_PADDING_ENV, policy);
                    policy
                }
                Err(e) => {
                    log::warn!("{}: {}, using {:?}", DECODE_PADDING_ENV, e, PaddingPolicy::default());
                    PaddingPolicy::default()
                }
            },
            _ => PaddingPolicy::default(),
        };

        Self { padding }
    }
}
