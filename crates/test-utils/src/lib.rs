//! Shared helpers for the `dagbisect` integration tests.
//!
//! - [`builders`]: DAG listings, events and search params.
//! - [`scripted_transport`]: a `Transport` that replays canned oracle frames.

pub mod builders;
pub mod scripted_transport;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Per-test timeout used by [`with_timeout`].
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured by the harness and only shown for failing tests. Use
/// `RUST_LOG=dagbisect=debug` to see the per-round engine logs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `fut`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(value) => value,
        Err(_) => panic!("test timed out after {:?}", TEST_TIMEOUT),
    }
}
