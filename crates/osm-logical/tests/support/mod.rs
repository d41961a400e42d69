//! Shared helpers for osm-logical integration tests

#![allow(dead_code, unused_imports)]

use std::sync::Once;

#[cfg(feature = "postgres")]
mod capture;
#[cfg(feature = "postgres")]
pub use capture::CaptureBuilder;

static INIT: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("osm_logical=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}
