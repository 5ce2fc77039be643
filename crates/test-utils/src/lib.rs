//! Fixtures for driving a `Supervisor` without touching the disk or
//! spawning processes.

pub mod builders;
pub mod fake_extractor;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use respawn::logging;

static INIT: Once = Once::new();

/// Upper bound for one supervision scenario. Grace periods in fixtures are
/// milliseconds, so anything close to this is a loop that never ends.
pub const SCENARIO_TIMEOUT: Duration = Duration::from_secs(5);

/// Route supervisor logs into the test harness's captured output.
///
/// Uses the same `RESPAWN_LOG` filter as the binary, e.g.
/// `RESPAWN_LOG=respawn::supervisor=debug cargo test -- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(logging::env_filter(None))
            .with_test_writer()
            .try_init();
    });
}

/// Await a supervision future, failing the test if it outlives
/// [`SCENARIO_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(SCENARIO_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("supervision did not finish within {SCENARIO_TIMEOUT:?}"),
    }
}
