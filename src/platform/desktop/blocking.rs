use std::time::Instant;

use tokio::task::JoinError;

/// Runs a short blocking call (a local SQLite query) on the runtime's
/// blocking pool so the UI task can paint while it waits, and logs how long
/// it took under `operation`. Errs only when the call panicked.
pub async fn run_blocking<F, T>(operation: &'static str, f: F) -> Result<T, JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let started = Instant::now();
    let out = tokio::task::spawn_blocking(f).await;
    tracing::debug!(
        operation,
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = out.is_ok(),
        "blocking call finished"
    );
    out
}
