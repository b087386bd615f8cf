//! Tracing subscriber setup for processes embedding the gateway.

use anyhow::Context;
use serde::Deserialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the stderr log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Installs the global subscriber: an `EnvFilter` from `RUST_LOG` (default
/// [`DEFAULT_FILTER`]) and a stderr `fmt` layer in the requested format.
///
/// Returns `false` when a global subscriber was already installed.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` holds an invalid filter directive.
pub fn init_tracing(format: LogFormat) -> anyhow::Result<bool> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid RUST_LOG directives: {directives}"))?,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .try_init()
        .is_ok())
}
