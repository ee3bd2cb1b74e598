// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Logging setup
// `log` facade, `env_logger` backend writing to stderr or to the configured file

use crate::config::LOG_FILE_ENV;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logging system once per process.
/// Checks B64U_LOG_FILE to pick the target; the filter comes from `RUST_LOG` (default `info`).
pub fn init_logging() {
    INIT.call_once(|| {
        let log_file = std::env::var(LOG_FILE_ENV).ok().filter(|path| !path.is_empty());

        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        if let Some(ref path) = log_file {
            match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => {
                    eprintln!("b64u: Failed to open log file {}: {}", path, e);
                    eprintln!("b64u: Falling back to stderr logging");
                }
            }
        }

        // The host process may already have a logger installed
        if let Err(e) = builder.try_init() {
            eprintln!("b64u: Logger not installed: {}", e);
        }
    });
}

/// Optimized trace logging - only evaluates arguments if trace is enabled
#[macro_export]
macro_rules! trace_opt {
    ($($arg:tt)*) => {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!($($arg)*);
        }
    };
}

/// Optimized debug logging - only evaluates arguments if debug is enabled
#[macro_export]
macro_rules! debug_opt {
    ($($arg:tt)*) => {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!($($arg)*);
        }
    };
}
