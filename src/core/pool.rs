use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinError;

/// Errors from the shared worker pools
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Worker pool is closed")]
    Closed,

    #[error("Worker task failed: {0}")]
    Join(#[from] JoinError),
}

/// Process-wide pair of bounded pools
///
/// The proximity pool runs CPU-bound matching on the blocking thread pool,
/// at most `proximity_workers` jobs at a time. The scoring pool bounds how many
/// remote scoring calls are in flight. Both are created once and shared by
/// every reward calculation; callers wait for a permit when a pool is
/// saturated.
#[derive(Debug)]
pub struct WorkerPools {
    proximity: Arc<Semaphore>,
    scoring: Arc<Semaphore>,
    proximity_workers: usize,
    scoring_workers: usize,
}

impl WorkerPools {
    pub fn new(proximity_workers: usize, scoring_workers: usize) -> Self {
        let proximity_workers = proximity_workers.max(1);
        let scoring_workers = scoring_workers.max(1);

        Self {
            proximity: Arc::new(Semaphore::new(proximity_workers)),
            scoring: Arc::new(Semaphore::new(scoring_workers)),
            proximity_workers,
            scoring_workers,
        }
    }

    pub fn proximity_workers(&self) -> usize {
        self.proximity_workers
    }

    pub fn scoring_workers(&self) -> usize {
        self.scoring_workers
    }

    pub fn idle_proximity_workers(&self) -> usize {
        self.proximity.available_permits()
    }

    pub fn idle_scoring_workers(&self) -> usize {
        self.scoring.available_permits()
    }

    /// Run a CPU-bound job on the proximity pool and wait for its result
    pub async fn run_proximity<F, R>(&self, job: F) -> Result<R, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let permit = Arc::clone(&self.proximity)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        // The permit travels with the job so it is only released once the
        // blocking work is done, even if the caller stops waiting.
        let result = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await?;

        Ok(result)
    }

    /// Reserve a scoring slot; hold the permit for the duration of the call
    pub async fn acquire_scoring(&self) -> Result<OwnedSemaphorePermit, PoolError> {
        Arc::clone(&self.scoring)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)
    }

    /// Refuse new work; queued waiters receive [`PoolError::Closed`]
    pub fn close(&self) {
        self.proximity.close();
        self.scoring.close();
    }
}

impl Default for WorkerPools {
    fn default() -> Self {
        Self::new(default_proximity_workers(), 64)
    }
}

/// One proximity worker per available CPU
pub fn default_proximity_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
