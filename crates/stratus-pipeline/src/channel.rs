//! Channel operations that race against a shutdown signal.
//!
//! Every blocking point in the pipeline goes through these helpers, so
//! cancelling the shared [`CancellationToken`] unblocks every stage within
//! one scheduling step. Without this, a full bounded channel whose consumer
//! already stopped would park its producer forever.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Receives the next item from `rx`, or returns `None` as soon as
/// `shutdown` is cancelled.
///
/// Closure of the channel and cancellation are indistinguishable to the
/// caller: both end consumption, and neither is an error. While the token
/// stays uncancelled this behaves exactly like [`mpsc::Receiver::recv`],
/// so no item is ever dropped or observed twice.
pub async fn recv_with_shutdown<T>(
    shutdown: &CancellationToken,
    rx: &mut mpsc::Receiver<T>,
) -> Option<T> {
    tokio::select! {
        () = shutdown.cancelled() => None,
        item = rx.recv() => item,
    }
}

/// Sends `value` to `tx`, returning `false` if `shutdown` is cancelled or
/// the receiver is gone before the send completes.
///
/// A `false` return tells the caller to stop producing. The value is
/// dropped rather than delivered, which is only acceptable because both
/// causes mean nobody downstream is listening anymore.
pub async fn send_with_shutdown<T>(
    shutdown: &CancellationToken,
    tx: &mpsc::Sender<T>,
    value: T,
) -> bool {
    tokio::select! {
        () = shutdown.cancelled() => false,
        sent = tx.send(value) => sent.is_ok(),
    }
}
