//! Integration test crate for DraftForge.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple draftforge crates to verify they work
//! together.

#[cfg(test)]
mod authoring;

#[cfg(test)]
mod roundtrip;

#[cfg(test)]
mod templates;

/// Route tracing output through the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
#[cfg(test)]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
