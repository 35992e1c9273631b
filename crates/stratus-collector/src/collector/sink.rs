//! The envelope sink.
//!
//! Consumes the merged pipeline output and writes one JSON object per line.
//! The sink is the only place envelopes are serialized, so output framing
//! lives in exactly one spot.

use stratus_core::{Envelope, Error, Kind, Result};
use stratus_pipeline::recv_with_shutdown;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Per-kind tally of the envelopes a collection run wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkSummary {
    pub management_groups: usize,
    pub management_group_role_assignments: usize,
}

impl SinkSummary {
    fn record(&mut self, kind: Kind) {
        match kind {
            Kind::ManagementGroup => self.management_groups += 1,
            Kind::ManagementGroupRoleAssignments => self.management_group_role_assignments += 1,
        }
    }

    /// Total number of envelopes written.
    pub const fn total(&self) -> usize {
        self.management_groups + self.management_group_role_assignments
    }
}

/// Writes every envelope from `stream` to `writer` as JSON lines.
///
/// Consumption stops when the stream closes or `shutdown` is cancelled;
/// either way the writer is flushed and the tally of what was actually
/// written is returned, so an interrupted run still leaves well-formed
/// output behind.
pub async fn write_envelopes<W>(
    shutdown: &CancellationToken,
    mut stream: mpsc::Receiver<Envelope>,
    mut writer: W,
) -> Result<SinkSummary>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = SinkSummary::default();

    while let Some(envelope) = recv_with_shutdown(shutdown, &mut stream).await {
        let mut line = serde_json::to_vec(&envelope).map_err(|e| Error::Decode {
            context: format!("serializing envelope: {e}"),
        })?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        summary.record(envelope.kind());
    }

    writer.flush().await?;
    Ok(summary)
}
