//! Deterministic projections for systematic investment plans (SIP) and
//! systematic withdrawal plans (SWP), with report export, a CLI and an HTTP
//! API on top.

pub mod api;
pub mod core;
pub mod plan;
pub mod report;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber once. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
