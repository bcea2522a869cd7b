//! Servers visible to the account: listing, live usage and power control.

use ptero_core::types::{Item, ListParams, ListResponse};
use ptero_core::{ErrorContext, PanelClient, Result};
use reqwest::Method;
use serde_json::json;
use tracing::info;

use crate::models::{ClientServerAttributes, PowerSignal, ResourceUsage};

const RESOURCE: &str = "Server";

/// Client-scope server access. Calls are sent directly, without a queue.
#[derive(Debug, Clone)]
pub struct ClientServers {
    client: PanelClient,
}

impl ClientServers {
    /// Bind to a panel client.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    /// First page of servers the account can access.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self) -> Result<Vec<ClientServerAttributes>> {
        self.list_with(&ListParams::new()).await
    }

    /// One page of servers with explicit paging and filters.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list_with(&self, params: &ListParams) -> Result<Vec<ClientServerAttributes>> {
        let context = ErrorContext::new(RESOURCE).action("listing servers");
        let page: ListResponse<ClientServerAttributes> = self
            .client
            .get_json("/", params.to_pairs(), &context)
            .await?;
        Ok(page.into_attributes())
    }

    /// A single server by its short identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] when the server is unknown or not visible.
    pub async fn get(&self, identifier: &str) -> Result<ClientServerAttributes> {
        let context = ErrorContext::new(RESOURCE).identifier(identifier);
        let item: Item<ClientServerAttributes> = self
            .client
            .get_json(&format!("/servers/{identifier}"), Vec::new(), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Current state and usage counters.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn resources(&self, identifier: &str) -> Result<ResourceUsage> {
        let context = ErrorContext::new(RESOURCE)
            .identifier(identifier)
            .action("loading resource usage");
        let item: Item<ResourceUsage> = self
            .client
            .get_json(&format!("/servers/{identifier}/resources"), Vec::new(), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Send a power signal.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error, for example a conflict while the
    /// server is still installing.
    pub async fn power(&self, identifier: &str, signal: PowerSignal) -> Result<()> {
        info!(identifier, %signal, "sending power signal");
        let context = ErrorContext::new(RESOURCE)
            .identifier(identifier)
            .action(format!("sending {signal}"));
        self.client
            .send_empty(
                Method::POST,
                &format!("/servers/{identifier}/power"),
                Some(json!({ "signal": signal })),
                &context,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::{PowerSignal, UserClient};
    use ptero_core::Error;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_attributes() -> serde_json::Value {
        json!({
            "server_owner": true,
            "identifier": "1a7ce997",
            "uuid": "1a7ce997-259b-452e-8b4e-cecc464142ca",
            "name": "Survival",
            "node": "nyc-01",
            "sftp_details": { "ip": "nyc-01.nodes.example.com", "port": 2022 },
            "description": "",
            "limits": {
                "memory": 2048, "swap": 0, "disk": 10240,
                "io": 500, "cpu": 200, "threads": null
            },
            "is_suspended": false,
            "is_installing": false,
            "is_transferring": false
        })
    }

    #[tokio::test]
    async fn list_and_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/client/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{ "object": "server", "attributes": server_attributes() }],
                "meta": { "pagination": {
                    "total": 1, "count": 1, "per_page": 50,
                    "current_page": 2, "total_pages": 2, "links": []
                } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/client/servers/1a7ce997"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "server",
                "attributes": server_attributes()
            })))
            .mount(&server)
            .await;

        let client = UserClient::new(server.uri(), "ptlc_key").unwrap();
        let servers = client
            .servers()
            .list_with(&ptero_core::ListParams::new().page(2))
            .await
            .unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].sftp_details.port, 2022);

        let one = client.servers().get("1a7ce997").await.unwrap();
        assert!(one.server_owner);
        assert_eq!(one.limits.memory, 2048);
    }

    #[tokio::test]
    async fn resources_report_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/client/servers/1a7ce997/resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "stats",
                "attributes": {
                    "current_state": "offline",
                    "is_suspended": false,
                    "resources": {
                        "memory_bytes": 0, "cpu_absolute": 0.0, "disk_bytes": 1024,
                        "network_rx_bytes": 0, "network_tx_bytes": 0, "uptime": 0
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = UserClient::new(server.uri(), "ptlc_key").unwrap();
        let usage = client.servers().resources("1a7ce997").await.unwrap();
        assert_eq!(usage.current_state, "offline");
        assert_eq!(usage.resources.disk_bytes, 1024);
    }

    #[tokio::test]
    async fn power_sends_signal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/client/servers/1a7ce997/power"))
            .and(body_json(json!({ "signal": "restart" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = UserClient::new(server.uri(), "ptlc_key").unwrap();
        client
            .servers()
            .power("1a7ce997", PowerSignal::Restart)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_server_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/client/servers/deadbeef"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errors": [{
                    "code": "NotFoundHttpException",
                    "status": "404",
                    "detail": "The requested resource could not be found on the server."
                }]
            })))
            .mount(&server)
            .await;

        let client = UserClient::new(server.uri(), "ptlc_key").unwrap();
        match client.servers().get("deadbeef").await.unwrap_err() {
            Error::NotFound { resource, identifier } => {
                assert_eq!(resource, "Server");
                assert_eq!(identifier, "deadbeef");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
