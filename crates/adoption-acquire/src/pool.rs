use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Default number of in-flight requests per stage.
pub const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Run `worker` over every item with at most `limit` workers alive at once.
///
/// A permit is taken *before* each task is spawned and released when its
/// future finishes, so no more than `limit` workers (and therefore no more
/// than `limit` network requests) are ever in flight. Results come back
/// through a single channel in completion order. A worker that panics is
/// logged and contributes no result; the rest of the batch carries on.
pub async fn run_bounded<I, T, F, Fut>(items: Vec<I>, limit: NonZeroUsize, worker: F) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(limit.get()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut handles = Vec::with_capacity(total);

    for item in items {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            tracing::error!("Worker pool semaphore closed; stopping admission");
            break;
        };
        let task = worker(item);
        let tx = tx.clone();
        handles.push(tokio::spawn(async move {
            let result = task.await;
            drop(permit);
            // The receiver outlives every task.
            let _ = tx.send(result);
        }));
    }
    drop(tx);

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Worker task aborted without a result");
        }
    }

    let mut results = Vec::with_capacity(total);
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    results
}
