//! Process-wide logging setup.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the `tracing` subscriber once per process.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` and above are
/// shown. Later calls are no-ops and return `false`.
pub fn init(default_level: tracing::Level) -> bool {
    let mut installed = false;
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();
        // Another subscriber may already be set (e.g. by a test harness)
        installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok();
    });
    installed
}
