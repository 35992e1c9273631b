//! Curated resource models and the tagged envelope union.
//!
//! The collector never forwards raw API payloads. Clients decode whatever
//! the wire carries and convert it into the flat models defined here, so
//! everything downstream of the client sees one stable schema regardless
//! of API version drift.
//!
//! All models serialize with camelCase field names to match the casing
//! consumers of the output already expect from ARM.

use crate::common::error::Result;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A management group as curated for downstream consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementGroup {
    /// Fully qualified ARM resource id, e.g.
    /// `/providers/Microsoft.Management/managementGroups/contoso`.
    pub id: String,
    /// Short name of the group, the last segment of [`id`](Self::id).
    pub name: String,
    /// Human-readable name shown in the portal.
    pub display_name: String,
    /// Id of the AAD tenant the group belongs to.
    pub tenant_id: String,
}

/// A role assignment granted at some scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    /// Fully qualified ARM resource id of the assignment.
    pub id: String,
    /// Assignment name (a GUID).
    pub name: String,
    /// Id of the role definition being granted.
    pub role_definition_id: String,
    /// Object id of the principal the role is granted to.
    pub principal_id: String,
    /// Scope the assignment applies at.
    pub scope: String,
}

/// One role assignment paired with the management group it was collected
/// under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementGroupRoleAssignment {
    /// Id of the owning management group as reported by the API for this
    /// record, not necessarily the group the listing was keyed on.
    pub management_group_id: String,
    pub role_assignment: RoleAssignment,
}

/// Aggregated role assignments of a single management group.
///
/// One of these is produced per group the collector visits, even when the
/// group has no assignments or its listing failed partway through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementGroupRoleAssignments {
    pub management_group_id: String,
    pub role_assignments: Vec<ManagementGroupRoleAssignment>,
}

impl ManagementGroupRoleAssignments {
    /// Creates an empty aggregate for `management_group_id`.
    pub const fn new(management_group_id: String) -> Self {
        Self {
            management_group_id,
            role_assignments: Vec::new(),
        }
    }
}

/// One item of a paginated per-parent listing.
///
/// `parent_id` carries the parent link the API reported for the record
/// itself. Failed page fetches surface here as an `Err` outcome so the
/// consumer decides whether a partial listing is still worth keeping.
#[derive(Debug)]
pub struct Listed<T> {
    /// Parent the record belongs to.
    pub parent_id: String,
    /// The decoded record, or the error that ended the listing.
    pub outcome: Result<T>,
}

/// Discriminator for [`Envelope`] variants.
///
/// The set is closed: adding a result type means adding a variant here,
/// and the compiler walks every sink dispatch that needs updating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    ManagementGroup,
    ManagementGroupRoleAssignments,
}

impl Kind {
    /// The wire tag for this discriminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::ManagementGroup => "managementGroup",
            Kind::ManagementGroupRoleAssignments => "managementGroupRoleAssignments",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged wrapper around one aggregated collection result.
///
/// Serializes adjacently tagged, e.g.
/// `{"kind":"managementGroup","data":{...}}`, which is what the sink
/// writes as one output line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Envelope {
    ManagementGroup(ManagementGroup),
    ManagementGroupRoleAssignments(ManagementGroupRoleAssignments),
}

impl Envelope {
    /// The discriminator of this envelope.
    pub const fn kind(&self) -> Kind {
        match self {
            Envelope::ManagementGroup(_) => Kind::ManagementGroup,
            Envelope::ManagementGroupRoleAssignments(_) => Kind::ManagementGroupRoleAssignments,
        }
    }
}
