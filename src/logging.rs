// src/logging.rs
//! Tracing setup shared by both binaries.
//!
//! `RUST_LOG` drives the filter (default: `info` for every event target this
//! crate emits, `warn` for dependencies); `MOTOR_MATCH_LOG_FORMAT=json`
//! switches to JSON lines.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "MOTOR_MATCH_LOG_FORMAT";

/// Events carry explicit targets, so each one is listed next to the module
/// paths of the two binaries.
const DEFAULT_FILTER: &str = "consolidation=info,scoring=info,ranking=info,catalog=info,\
report=info,config=info,api=info,motor_match=info,motor_report=info,warn";

/// Filter used when `RUST_LOG` is unset or unparsable.
pub fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

fn json_requested() -> bool {
    std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber. Safe to call twice (second call is a no-op).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let result = if json_requested() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
