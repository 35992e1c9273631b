//! Management group discovery.

use crate::collector::client::DirectoryClient;
use std::sync::Arc;
use stratus_core::Envelope;
use stratus_pipeline::{recv_with_shutdown, send_with_shutdown};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Starts the management group discovery stage.
///
/// Groups stream out as [`Envelope::ManagementGroup`] items in API order.
/// A listing error ends the stage early: everything discovered before the
/// failure has already been forwarded, nothing after it is produced, and
/// the output channel closes.
pub fn list_management_groups<C>(
    shutdown: &CancellationToken,
    client: Arc<C>,
) -> mpsc::Receiver<Envelope>
where
    C: DirectoryClient,
{
    let (out_tx, out_rx) = mpsc::channel(1);
    let shutdown = shutdown.clone();

    tokio::spawn(async move {
        let mut groups = client.list_management_groups(&shutdown);
        let mut count = 0_usize;

        while let Some(group) = recv_with_shutdown(&shutdown, &mut groups).await {
            match group {
                Err(error) => {
                    tracing::error!(%error, "unable to continue processing management groups");
                    return;
                }
                Ok(group) => {
                    tracing::trace!(management_group_id = %group.id, "found management group");
                    count += 1;
                    let envelope = Envelope::ManagementGroup(group);
                    if !send_with_shutdown(&shutdown, &out_tx, envelope).await {
                        return;
                    }
                }
            }
        }

        tracing::info!(count, "finished listing all management groups");
    });

    out_rx
}
