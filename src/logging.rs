//! Structured logging setup.
//!
//! Uses `tracing` with `tracing-subscriber`.  Diagnostics go to stderr so
//! the themed report output on stdout stays clean.
//!
//! Environment variables:
//! - `MARQUEE_LOG` or `RUST_LOG`: filter directives (e.g. `marquee=debug`)
//! - `MARQUEE_LOG_FORMAT`: `pretty`, `compact`, or `json`

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber. Call once, before any component runs.
pub fn init() {
    let filter = std::env::var("MARQUEE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("marquee=info,warn"));

    let format = std::env::var("MARQUEE_LOG_FORMAT")
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
