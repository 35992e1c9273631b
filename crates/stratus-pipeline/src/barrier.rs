//! Completion barrier for fan-in stages.

use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Waits for every task in `workers` to finish, then drops `out` so the
/// merged output channel closes.
///
/// The caller hands over its last sender. Each worker holds its own clone,
/// so once this barrier returns and drops `out`, no sender remains and the
/// receiver sees end-of-stream. The channel therefore never closes while a
/// worker could still be sending, and always closes once all workers have
/// terminated, whether they finished, stopped on cancellation, or
/// panicked.
pub async fn close_after_workers<T>(mut workers: JoinSet<()>, out: mpsc::Sender<T>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(error) = joined {
            tracing::error!(%error, "pipeline worker task failed");
        }
    }
    drop(out);
}
