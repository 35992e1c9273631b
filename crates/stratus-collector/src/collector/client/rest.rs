//! The reqwest-backed production client.
//!
//! One listing call spawns one producer task that walks the paginated
//! collection and feeds decoded items into a bounded channel. Pages are
//! fetched lazily: a consumer that stops reading stalls the producer at the
//! channel, not at the API.

use super::DirectoryClient;
use super::wire::{Page, WireManagementGroup, WireRoleAssignment};
use crate::collector::config::Config;
use reqwest::Url;
use serde::de::DeserializeOwned;
use stratus_core::{Error, Listed, ManagementGroup, Result, RoleAssignment};
use stratus_pipeline::send_with_shutdown;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const MANAGEMENT_GROUPS_API_VERSION: &str = "2020-05-01";
const ROLE_ASSIGNMENTS_API_VERSION: &str = "2015-07-01";

/// [`DirectoryClient`] backed by the Azure Resource Manager REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl RestClient {
    /// Builds a client from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Transport {
                context: format!("building http client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Probes the ARM endpoint before any collection starts.
    ///
    /// Only reachability matters here: any HTTP response, success or not,
    /// proves the transport works. Auth problems surface later, attached to
    /// the listing they break.
    pub async fn test_connection(&self) -> Result<()> {
        self.http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| Error::Transport {
                context: format!("{}: {e}", self.base_url),
            })?;
        Ok(())
    }

    async fn fetch_page<T: DeserializeOwned>(&self, url: Url) -> Result<Page<T>> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::Transport {
                context: format!("{url}: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                context: url.to_string(),
            });
        }

        response.json().await.map_err(|e| Error::Decode {
            context: format!("{url}: {e}"),
        })
    }

    fn management_groups_url(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join("/providers/Microsoft.Management/managementGroups")
            .map_err(|e| Error::Decode {
                context: format!("management groups url: {e}"),
            })?;
        url.query_pairs_mut()
            .append_pair("api-version", MANAGEMENT_GROUPS_API_VERSION);
        Ok(url)
    }

    fn role_assignments_url(&self, parent_id: &str, filter: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!(
                "{parent_id}/providers/Microsoft.Authorization/roleAssignments"
            ))
            .map_err(|e| Error::Decode {
                context: format!("role assignments url for {parent_id}: {e}"),
            })?;
        url.query_pairs_mut()
            .append_pair("api-version", ROLE_ASSIGNMENTS_API_VERSION)
            .append_pair("$filter", filter);
        Ok(url)
    }
}

impl DirectoryClient for RestClient {
    fn list_management_groups(
        &self,
        shutdown: &CancellationToken,
    ) -> mpsc::Receiver<Result<ManagementGroup>> {
        let (tx, rx) = mpsc::channel(1);
        let client = self.clone();
        let shutdown = shutdown.clone();

        tokio::spawn(async move {
            let mut next = match client.management_groups_url() {
                Ok(url) => Some(url),
                Err(error) => {
                    let _ = send_with_shutdown(&shutdown, &tx, Err(error)).await;
                    return;
                }
            };

            while let Some(url) = next.take() {
                let fetched = tokio::select! {
                    () = shutdown.cancelled() => return,
                    fetched = client.fetch_page::<WireManagementGroup>(url) => fetched,
                };

                let page = match fetched {
                    Ok(page) => page,
                    Err(error) => {
                        let _ = send_with_shutdown(&shutdown, &tx, Err(error)).await;
                        return;
                    }
                };

                next = match page.next_url() {
                    Ok(url) => url,
                    Err(error) => {
                        let _ = send_with_shutdown(&shutdown, &tx, Err(error)).await;
                        return;
                    }
                };

                for group in page.value {
                    if !send_with_shutdown(&shutdown, &tx, Ok(group.into())).await {
                        return;
                    }
                }
            }
        });

        rx
    }

    fn list_role_assignments(
        &self,
        shutdown: &CancellationToken,
        parent_id: &str,
        filter: &str,
    ) -> mpsc::Receiver<Listed<RoleAssignment>> {
        let (tx, rx) = mpsc::channel(1);
        let client = self.clone();
        let shutdown = shutdown.clone();
        let parent_id = parent_id.to_owned();
        let filter = filter.to_owned();

        tokio::spawn(async move {
            let mut next = match client.role_assignments_url(&parent_id, &filter) {
                Ok(url) => Some(url),
                Err(error) => {
                    let item = Listed {
                        parent_id,
                        outcome: Err(error),
                    };
                    let _ = send_with_shutdown(&shutdown, &tx, item).await;
                    return;
                }
            };

            while let Some(url) = next.take() {
                let fetched = tokio::select! {
                    () = shutdown.cancelled() => return,
                    fetched = client.fetch_page::<WireRoleAssignment>(url) => fetched,
                };

                // One error item, then the stream ends. The consumer decides
                // what a partial listing is worth.
                let page = match fetched {
                    Ok(page) => page,
                    Err(error) => {
                        let item = Listed {
                            parent_id: parent_id.clone(),
                            outcome: Err(error),
                        };
                        let _ = send_with_shutdown(&shutdown, &tx, item).await;
                        return;
                    }
                };

                next = match page.next_url() {
                    Ok(url) => url,
                    Err(error) => {
                        let item = Listed {
                            parent_id: parent_id.clone(),
                            outcome: Err(error),
                        };
                        let _ = send_with_shutdown(&shutdown, &tx, item).await;
                        return;
                    }
                };

                for assignment in page.value {
                    let item = Listed {
                        parent_id: assignment
                            .reported_scope()
                            .unwrap_or(&parent_id)
                            .to_owned(),
                        outcome: Ok(assignment.into()),
                    };
                    if !send_with_shutdown(&shutdown, &tx, item).await {
                        return;
                    }
                }
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::config::{Command, ListCommand};
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            command: Command::List(ListCommand::ManagementGroups),
            base_url: Url::parse("https://management.azure.com").unwrap(),
            access_token: "token".into(),
            output: None,
            timeout: Duration::from_secs(5),
            json_logs: false,
        }
    }

    #[test]
    fn builds_the_management_groups_listing_url() {
        let client = RestClient::new(&test_config()).unwrap();

        let url = client.management_groups_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/providers/Microsoft.Management/managementGroups?api-version=2020-05-01"
        );
    }

    #[test]
    fn scopes_the_role_assignments_url_to_the_parent() {
        let client = RestClient::new(&test_config()).unwrap();

        let url = client
            .role_assignments_url(
                "/providers/Microsoft.Management/managementGroups/contoso",
                "atScope()",
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/providers/Microsoft.Management/managementGroups/contoso/providers/Microsoft.Authorization/roleAssignments?api-version=2015-07-01&%24filter=atScope%28%29"
        );
    }

    #[test]
    fn parent_paths_replace_any_base_path() {
        let config = Config {
            base_url: Url::parse("https://management.usgovcloudapi.net").unwrap(),
            ..test_config()
        };
        let client = RestClient::new(&config).unwrap();

        let url = client
            .role_assignments_url(
                "/providers/Microsoft.Management/managementGroups/gov",
                "atScope()",
            )
            .unwrap();
        assert!(url.as_str().starts_with(
            "https://management.usgovcloudapi.net/providers/Microsoft.Management/managementGroups/gov/"
        ));
    }
}
