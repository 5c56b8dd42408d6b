//! Tracing bootstrap for binaries and examples.
//!
//! The core itself only emits `tracing` events; subscribing is the calling
//! process's choice. [`init`] installs a sensible fmt subscriber honoring
//! `RUST_LOG`, defaulting to `info` for this crate.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber with env-filter support.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("loreweave=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
