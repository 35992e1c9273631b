//! Fan-out enumeration of per-group role assignments.
//!
//! Management group envelopes stream in, one aggregated role-assignment
//! envelope per group streams out. Between the two sits the full fan-out
//! machinery: a feed task unwraps envelopes into group ids, a dispatcher
//! spreads the ids across worker lanes, and a barrier closes the shared
//! output once every worker has drained its lane.

use crate::collector::client::DirectoryClient;
use std::sync::Arc;
use stratus_core::{Envelope, ManagementGroupRoleAssignment, ManagementGroupRoleAssignments};
use stratus_pipeline::{close_after_workers, demux, recv_with_shutdown, send_with_shutdown};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Worker lanes the production stage fans out across.
pub const LANES: usize = 25;

/// Assignments granted at the scope itself, not inherited ones.
const AT_SCOPE: &str = "atScope()";

/// Starts the role-assignment enumeration stage.
///
/// `management_groups` must carry [`Envelope::ManagementGroup`] items. Any
/// other kind stops the feed, since the upstream contract is broken past
/// recovery, while groups already handed to the workers still drain to
/// completion. A listing failure for a single group is logged and skipped;
/// the group still produces an envelope with whatever was collected before
/// the failure.
///
/// One [`Envelope::ManagementGroupRoleAssignments`] is emitted per group
/// received, in no particular order across groups. The returned channel
/// closes once every worker has finished.
pub fn list_role_assignments<C>(
    shutdown: &CancellationToken,
    client: Arc<C>,
    management_groups: mpsc::Receiver<Envelope>,
    width: usize,
) -> mpsc::Receiver<Envelope>
where
    C: DirectoryClient,
{
    let (out_tx, out_rx) = mpsc::channel(1);
    let (ids_tx, ids_rx) = mpsc::channel(1);
    let lanes = demux(shutdown, ids_rx, width);

    tokio::spawn(feed_ids(shutdown.clone(), management_groups, ids_tx));

    let mut workers = JoinSet::new();
    for lane in lanes {
        workers.spawn(enumerate_lane(
            shutdown.clone(),
            Arc::clone(&client),
            lane,
            out_tx.clone(),
        ));
    }

    tokio::spawn(async move {
        close_after_workers(workers, out_tx).await;
        tracing::info!("finished listing all management group role assignments");
    });

    out_rx
}

/// Unwraps management group envelopes into bare group ids for the lanes.
async fn feed_ids(
    shutdown: CancellationToken,
    mut management_groups: mpsc::Receiver<Envelope>,
    ids: mpsc::Sender<String>,
) {
    while let Some(envelope) = recv_with_shutdown(&shutdown, &mut management_groups).await {
        let group = match envelope {
            Envelope::ManagementGroup(group) => group,
            other => {
                tracing::error!(
                    kind = %other.kind(),
                    "unexpected envelope kind, unable to continue enumerating management group role assignments"
                );
                return;
            }
        };

        if !send_with_shutdown(&shutdown, &ids, group.id).await {
            return;
        }
    }
}

/// One worker: drains its lane, one group at a time.
async fn enumerate_lane<C>(
    shutdown: CancellationToken,
    client: Arc<C>,
    mut lane: mpsc::Receiver<String>,
    out: mpsc::Sender<Envelope>,
) where
    C: DirectoryClient,
{
    while let Some(group_id) = recv_with_shutdown(&shutdown, &mut lane).await {
        let mut aggregate = ManagementGroupRoleAssignments::new(group_id.clone());
        let mut items = client.list_role_assignments(&shutdown, &group_id, AT_SCOPE);

        while let Some(item) = recv_with_shutdown(&shutdown, &mut items).await {
            match item.outcome {
                Err(error) => {
                    tracing::error!(
                        management_group_id = %group_id,
                        %error,
                        "unable to continue processing role assignments for this management group"
                    );
                }
                Ok(role_assignment) => {
                    tracing::trace!(
                        management_group_id = %item.parent_id,
                        role_assignment_id = %role_assignment.id,
                        "found management group role assignment"
                    );
                    aggregate.role_assignments.push(ManagementGroupRoleAssignment {
                        management_group_id: item.parent_id,
                        role_assignment,
                    });
                }
            }
        }

        let count = aggregate.role_assignments.len();
        let envelope = Envelope::ManagementGroupRoleAssignments(aggregate);
        if !send_with_shutdown(&shutdown, &out, envelope).await {
            return;
        }
        tracing::debug!(
            management_group_id = %group_id,
            count,
            "finished listing management group role assignments"
        );
    }
}
