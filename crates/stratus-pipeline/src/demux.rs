//! Work distribution across a fixed set of consumer lanes.

use crate::channel::recv_with_shutdown;
use futures::future::select_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Splits `source` into `width` independently consumed lanes.
///
/// Each item read from `source` is delivered to exactly one lane,
/// whichever has send capacity first, so distribution follows consumer
/// readiness rather than a fixed rotation. A lane whose consumer stalls
/// holds at most one parked item and never blocks the rest. Cross-lane
/// ordering is unspecified.
///
/// The spawned dispatcher owns the only sender of every lane: all lanes
/// close once `source` is exhausted or `shutdown` is cancelled, and never
/// while a send on them could still be in flight.
///
/// # Panics
///
/// Panics if `width` is zero.
pub fn demux<T>(
    shutdown: &CancellationToken,
    mut source: mpsc::Receiver<T>,
    width: usize,
) -> Vec<mpsc::Receiver<T>>
where
    T: Send + 'static,
{
    assert!(width > 0, "demux requires at least one lane");

    // Lane capacity 1 keeps the dispatcher from queueing ahead of slow
    // consumers: an item is only parked on a lane whose worker asked
    // for it.
    let (lanes, outputs): (Vec<_>, Vec<_>) = (0..width).map(|_| mpsc::channel(1)).unzip();

    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        while let Some(item) = recv_with_shutdown(&shutdown, &mut source).await {
            let reservations = lanes.iter().map(|lane| Box::pin(lane.reserve()));
            let permit = tokio::select! {
                () = shutdown.cancelled() => break,
                (permit, _, _) = select_all(reservations) => permit,
            };
            match permit {
                Ok(permit) => permit.send(item),
                // A lane only closes when its worker is gone, which means
                // the stage is already tearing down.
                Err(_) => break,
            }
        }
        // Dropping the senders closes every lane.
    });

    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::task::JoinSet;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn delivers_every_item_exactly_once() {
        const ITEMS: u32 = 200;
        const WIDTH: usize = 5;

        let shutdown = CancellationToken::new();
        let (tx, rx) = mpsc::channel(1);
        let lanes = demux(&shutdown, rx, WIDTH);
        assert_eq!(lanes.len(), WIDTH);

        tokio::spawn(async move {
            for i in 0..ITEMS {
                if tx.send(i).await.is_err() {
                    return;
                }
            }
        });

        let mut readers = JoinSet::new();
        for mut lane in lanes {
            readers.spawn(async move {
                let mut seen = Vec::new();
                while let Some(item) = lane.recv().await {
                    seen.push(item);
                }
                seen
            });
        }

        let mut all = HashSet::new();
        let mut total = 0;
        while let Some(seen) = timeout(WAIT, readers.join_next())
            .await
            .expect("lanes must close")
        {
            for item in seen.expect("reader task") {
                total += 1;
                assert!(all.insert(item), "item delivered to more than one lane");
            }
        }
        assert_eq!(total, ITEMS as usize);
        assert_eq!(all.len(), ITEMS as usize);
    }

    #[tokio::test]
    async fn lanes_close_when_the_source_closes() {
        let shutdown = CancellationToken::new();
        let (tx, rx) = mpsc::channel::<u32>(1);
        let mut lanes = demux(&shutdown, rx, 3);
        drop(tx);

        for lane in &mut lanes {
            let item = timeout(WAIT, lane.recv()).await.expect("lane must close");
            assert_eq!(item, None);
        }
    }

    #[tokio::test]
    async fn lanes_close_on_cancellation() {
        let shutdown = CancellationToken::new();
        // The sender stays alive, so only cancellation can close the lanes.
        let (_tx, rx) = mpsc::channel::<u32>(1);
        let mut lanes = demux(&shutdown, rx, 3);

        shutdown.cancel();

        for lane in &mut lanes {
            let item = timeout(WAIT, lane.recv())
                .await
                .expect("cancellation must close the lanes");
            assert_eq!(item, None);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn a_stalled_lane_does_not_block_the_others() {
        const ITEMS: u32 = 50;

        let shutdown = CancellationToken::new();
        let (tx, rx) = mpsc::channel(1);
        let mut lanes = demux(&shutdown, rx, 3);
        // This lane never consumes; it can absorb at most one parked item.
        let stalled = lanes.remove(0);

        tokio::spawn(async move {
            for i in 0..ITEMS {
                if tx.send(i).await.is_err() {
                    return;
                }
            }
        });

        let mut readers = JoinSet::new();
        for mut lane in lanes {
            readers.spawn(async move {
                let mut count = 0_usize;
                while lane.recv().await.is_some() {
                    count += 1;
                }
                count
            });
        }

        let mut received = 0;
        while let Some(count) = timeout(WAIT, readers.join_next())
            .await
            .expect("active lanes must drain the source")
        {
            received += count.expect("reader task");
        }

        assert!(
            received >= ITEMS as usize - 1,
            "expected the active lanes to take all but the one parked item, got {received}"
        );
        drop(stalled);
    }
}
