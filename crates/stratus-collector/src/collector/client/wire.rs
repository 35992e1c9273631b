//! Raw ARM payload shapes.
//!
//! The REST API nests resource attributes under a `properties` object and
//! pages collections as `{"value": [...], "nextLink": "..."}`. These shapes
//! stay private to the client; everything leaving this module is converted
//! into the curated models of `stratus-core`.
//!
//! Unknown fields are ignored and missing `properties` blocks default to
//! empty, so API version drift degrades to empty strings instead of failed
//! runs.

use reqwest::Url;
use serde::Deserialize;
use stratus_core::{Error, ManagementGroup, Result, RoleAssignment};

/// One page of an ARM collection response.
///
/// The `value` default is spelled as a path so the derived `Deserialize`
/// impl does not require `T: Default`; items only ever need to deserialize.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// Parses the continuation link, if the page carries one.
    pub(super) fn next_url(&self) -> Result<Option<Url>> {
        match self.next_link.as_deref() {
            None | Some("") => Ok(None),
            Some(link) => Url::parse(link).map(Some).map_err(|e| Error::Decode {
                context: format!("nextLink `{link}`: {e}"),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireManagementGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: ManagementGroupProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ManagementGroupProperties {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub tenant_id: String,
}

impl From<WireManagementGroup> for ManagementGroup {
    fn from(wire: WireManagementGroup) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            display_name: wire.properties.display_name,
            tenant_id: wire.properties.tenant_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireRoleAssignment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: RoleAssignmentProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RoleAssignmentProperties {
    #[serde(default)]
    pub role_definition_id: String,
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub scope: String,
}

impl WireRoleAssignment {
    /// The parent link reported on the record itself, if any.
    pub(super) fn reported_scope(&self) -> Option<&str> {
        (!self.properties.scope.is_empty()).then_some(self.properties.scope.as_str())
    }
}

impl From<WireRoleAssignment> for RoleAssignment {
    fn from(wire: WireRoleAssignment) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            role_definition_id: wire.properties.role_definition_id,
            principal_id: wire.properties.principal_id,
            scope: wire.properties.scope,
        }
    }
}
