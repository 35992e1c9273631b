//! Streaming access to the resource directory.
//!
//! [`DirectoryClient`] is the seam between the enumeration stages and the
//! ARM REST API: stages consume item streams and never see pagination,
//! authentication, or wire shapes. The production implementation is
//! [`RestClient`]; tests substitute scripted fakes.
//!
//! ## Submodules
//!
//! - [`rest`] - The reqwest-backed production client.
//! - [`wire`] - Raw ARM payload shapes, private to the client.

mod rest;
mod wire;

pub use rest::RestClient;

use stratus_core::{Listed, ManagementGroup, Result, RoleAssignment};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Streaming directory listings.
///
/// Both methods return immediately; items arrive on the channel as the
/// underlying pages are fetched. Implementations observe `shutdown` at
/// every page fetch and item send, so a cancelled collection stops
/// producing within one scheduling step.
pub trait DirectoryClient: Send + Sync + 'static {
    /// Streams every management group visible to the caller.
    ///
    /// A failed page fetch surfaces as one `Err` item, after which the
    /// stream ends. Items already delivered stay valid.
    fn list_management_groups(
        &self,
        shutdown: &CancellationToken,
    ) -> mpsc::Receiver<Result<ManagementGroup>>;

    /// Streams the role assignments of one parent resource, restricted by
    /// `filter` (e.g. `atScope()`).
    ///
    /// Each item carries the parent link the API reported for the record,
    /// which is not always `parent_id`. A failed page fetch surfaces as one
    /// `Err` item, after which the stream ends.
    fn list_role_assignments(
        &self,
        shutdown: &CancellationToken,
        parent_id: &str,
        filter: &str,
    ) -> mpsc::Receiver<Listed<RoleAssignment>>;
}
