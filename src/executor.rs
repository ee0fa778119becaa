//! Runs blocking work off the async scheduler under a wall-clock limit.
//!
//! Each call gets its own OS thread. When the limit elapses the caller stops waiting and the
//! thread is left to finish on its own; nothing interrupts it mid-call, and its result is
//! dropped when it eventually arrives.

use std::thread;
use std::time::{Duration, Instant};

use eyre::eyre;
use log::{debug, warn};
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Error, Debug)]
pub enum BoundedError {
    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("{0:#}")]
    Failed(eyre::Report),
}

/// Run `job` on a dedicated worker thread and wait at most `limit` for its result.
pub async fn run_bounded<T, F>(label: &str, limit: Duration, job: F) -> Result<T, BoundedError>
where
    T: Send + 'static,
    F: FnOnce() -> eyre::Result<T> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let started = Instant::now();

    thread::Builder::new()
        .name(format!("{label}-worker"))
        .spawn(move || {
            // Receiver is gone once the caller has given up waiting.
            let _ = tx.send(job());
        })
        .map_err(|e| BoundedError::Failed(eyre!("failed to spawn {label} worker: {e}")))?;

    match tokio::time::timeout(limit, rx).await {
        Ok(Ok(result)) => {
            debug!("{label} finished in {:?}", started.elapsed());
            result.map_err(BoundedError::Failed)
        }
        Ok(Err(_)) => Err(BoundedError::Failed(eyre!("{label} worker exited without a result"))),
        Err(_) => {
            warn!("{label} abandoned after {limit:?}; worker left to finish in the background");
            Err(BoundedError::TimedOut(limit))
        }
    }
}
