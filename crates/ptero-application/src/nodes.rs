//! Panel nodes and their allocations.

use ptero_core::entity::{require_id, EntityCell, EntityState, Identified};
use ptero_core::types::{ListParams, ListResponse};
use ptero_core::{ErrorContext, PanelClient, Queued, RateLimitedQueue, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::collection::{self, BulkResult, BulkSettled, Collection};
use crate::models::{
    AllocatedResources, AllocationAttributes, CreateAllocationRequest, CreateNodeRequest,
    NodeAttributes, UpdateNodeRequest,
};

const RESOURCE: &str = "Node";

fn node_path(id: u64) -> String {
    format!("/nodes/{id}")
}

impl Identified for NodeAttributes {
    fn id(&self) -> u64 {
        self.id
    }
}

async fn fetch_configuration(client: &PanelClient, id: u64) -> Result<Value> {
    let context = ErrorContext::new(RESOURCE)
        .identifier(id)
        .action("fetching daemon configuration");
    client
        .get_json(&format!("/nodes/{id}/configuration"), Vec::new(), &context)
        .await
}

/// Collection manager for `/nodes`.
#[derive(Debug, Clone)]
pub struct Nodes {
    inner: Collection,
}

impl Nodes {
    /// Create a manager with its own request queue.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            inner: Collection::new(client, "nodes", "/nodes", RESOURCE),
        }
    }

    /// Queue used for create and delete.
    #[must_use]
    pub fn queue(&self) -> &RateLimitedQueue {
        self.inner.queue()
    }

    /// Fetch one page of nodes.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<Node>> {
        let page = self.inner.list::<NodeAttributes>(params).await?;
        Ok(self.wrap_all(page.into_attributes()))
    }

    /// Fetch every page of nodes.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<Node>> {
        let nodes = self.inner.list_all(params).await?;
        Ok(self.wrap_all(nodes))
    }

    /// Fetch a node by id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: u64) -> Result<Node> {
        let attributes = self.inner.get(id).await?;
        Ok(Node::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Daemon configuration document for node `id`.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn configuration(&self, id: u64) -> Result<Value> {
        fetch_configuration(self.inner.client(), id).await
    }

    /// Queue the creation of a node.
    pub fn create(&self, request: CreateNodeRequest) -> Queued<Node> {
        self.inner.create(request, Node::from_attributes)
    }

    /// Queue the deletion of a node.
    pub fn delete(&self, id: u64) -> Queued<()> {
        self.inner.delete(id)
    }

    /// Queue several creations; fails on the first rejected one.
    pub fn bulk_create(&self, requests: Vec<CreateNodeRequest>) -> BulkResult<Node> {
        self.inner.bulk_create(requests, Node::from_attributes)
    }

    /// Queue several creations and report every outcome in input order.
    pub fn bulk_create_settled(&self, requests: Vec<CreateNodeRequest>) -> BulkSettled<Node> {
        self.inner.bulk_create_settled(requests, Node::from_attributes)
    }

    /// Queue several deletions; fails on the first rejected one.
    pub fn bulk_delete(&self, ids: impl IntoIterator<Item = u64>) -> BulkResult<()> {
        self.inner.bulk_delete(ids)
    }

    /// Queue several deletions and report every outcome in input order.
    pub fn bulk_delete_settled(&self, ids: impl IntoIterator<Item = u64>) -> BulkSettled<()> {
        self.inner.bulk_delete_settled(ids)
    }

    fn wrap_all(&self, nodes: Vec<NodeAttributes>) -> Vec<Node> {
        nodes
            .into_iter()
            .map(|attributes| Node::from_attributes(self.inner.client().clone(), attributes))
            .collect()
    }
}

/// A single daemon node.
#[derive(Debug, Clone)]
pub struct Node {
    client: PanelClient,
    state: EntityCell<NodeAttributes>,
}

impl Node {
    /// Unloaded wrapper; call [`Node::fetch`] to populate it.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            client,
            state: EntityCell::unloaded(),
        }
    }

    /// Wrapper around attributes received from the panel.
    #[must_use]
    pub fn from_attributes(client: PanelClient, attributes: NodeAttributes) -> Self {
        Self {
            client,
            state: EntityCell::loaded(attributes),
        }
    }

    /// Load node `id` into this wrapper.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error; the wrapper is unchanged on failure.
    pub async fn fetch(&self, id: u64) -> Result<()> {
        let context = ErrorContext::new(RESOURCE).identifier(id);
        collection::load(&self.client, &self.state, &node_path(id), &context).await
    }

    /// Reload the current node.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn refresh(&self) -> Result<()> {
        collection::refresh(&self.client, &self.state, RESOURCE, node_path).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update(&self, changes: &UpdateNodeRequest) -> Result<()> {
        collection::patch(&self.client, &self.state, RESOURCE, node_path, changes).await
    }

    /// Delete the node and unload the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn delete(&self) -> Result<()> {
        collection::remove(&self.client, &self.state, RESOURCE, node_path).await
    }

    /// Daemon configuration document.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn configuration(&self) -> Result<Value> {
        let id = require_id(&self.state, RESOURCE)?;
        fetch_configuration(&self.client, id).await
    }

    /// Allocations on this node.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded.
    pub fn allocations(&self) -> Result<NodeAllocations> {
        let id = require_id(&self.state, RESOURCE)?;
        Ok(NodeAllocations {
            client: self.client.clone(),
            node_id: id,
        })
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> EntityState<NodeAttributes> {
        self.state.snapshot()
    }

    /// Copy of the loaded attributes.
    #[must_use]
    pub fn attributes(&self) -> Option<NodeAttributes> {
        self.state.attributes()
    }

    /// Node id.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.state.read(|a| a.id)
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.state.read(|a| a.name.clone())
    }

    /// Daemon host name.
    #[must_use]
    pub fn fqdn(&self) -> Option<String> {
        self.state.read(|a| a.fqdn.clone())
    }

    /// Daemon scheme; "https" when unloaded or unset.
    #[must_use]
    pub fn scheme(&self) -> String {
        self.state
            .read(|a| a.scheme.clone())
            .filter(|scheme| !scheme.is_empty())
            .unwrap_or_else(|| "https".to_string())
    }

    /// Whether the node takes part in automatic deployment.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.state.read(|a| a.public).unwrap_or(false)
    }

    /// Whether the node is in maintenance mode.
    #[must_use]
    pub fn is_in_maintenance_mode(&self) -> bool {
        self.state.read(|a| a.maintenance_mode).unwrap_or(false)
    }

    /// Whether the daemon sits behind a proxy.
    #[must_use]
    pub fn is_behind_proxy(&self) -> bool {
        self.state.read(|a| a.behind_proxy).unwrap_or(false)
    }

    /// Location id.
    #[must_use]
    pub fn location_id(&self) -> Option<u64> {
        self.state.read(|a| a.location_id)
    }

    /// Memory in MiB.
    #[must_use]
    pub fn memory(&self) -> Option<u64> {
        self.state.read(|a| a.memory)
    }

    /// Disk in MiB.
    #[must_use]
    pub fn disk(&self) -> Option<u64> {
        self.state.read(|a| a.disk)
    }

    /// Resources already assigned to servers, zero when not reported.
    #[must_use]
    pub fn allocated_resources(&self) -> AllocatedResources {
        self.state
            .read(|a| a.allocated_resources)
            .flatten()
            .unwrap_or_default()
    }
}

/// `/nodes/{id}/allocations` for one node. Calls are direct.
#[derive(Debug, Clone)]
pub struct NodeAllocations {
    client: PanelClient,
    node_id: u64,
}

impl NodeAllocations {
    fn path(&self) -> String {
        format!("/nodes/{}/allocations", self.node_id)
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(RESOURCE).identifier(self.node_id)
    }

    /// Node these allocations belong to.
    #[must_use]
    pub const fn node_id(&self) -> u64 {
        self.node_id
    }

    /// List one page of allocations.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<AllocationAttributes>> {
        let context = self.context().action("listing allocations");
        let page: ListResponse<AllocationAttributes> = self
            .client
            .get_json(&self.path(), params.to_pairs(), &context)
            .await?;
        Ok(page.into_attributes())
    }

    /// Create allocations for an IP and a set of ports. The panel returns no body.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn create(&self, request: &CreateAllocationRequest) -> Result<()> {
        debug!(node = self.node_id, ip = %request.ip, "creating allocations");
        let body = serde_json::to_value(request)?;
        let context = self.context().action("creating allocations");
        self.client
            .send_empty(Method::POST, &self.path(), Some(body), &context)
            .await
    }

    /// Delete one allocation.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn delete(&self, allocation_id: u64) -> Result<()> {
        let path = format!("{}/{allocation_id}", self.path());
        let context = ErrorContext::new("Allocation").identifier(allocation_id);
        self.client
            .send_empty(Method::DELETE, &path, None, &context)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApplicationClient;
    use ptero_core::Error;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn node_json(id: u64, scheme: &str) -> Value {
        json!({
            "object": "node",
            "attributes": {
                "id": id,
                "uuid": "1046d1d1-b8ef-4771-82b1-2b5946d33397",
                "public": true,
                "name": format!("node-{id}"),
                "description": null,
                "location_id": 1,
                "fqdn": format!("node{id}.example.com"),
                "scheme": scheme,
                "behind_proxy": false,
                "maintenance_mode": false,
                "memory": 16384,
                "memory_overallocate": 0,
                "disk": 102_400,
                "disk_overallocate": 0,
                "upload_size": 100,
                "daemon_listen": 8080,
                "daemon_sftp": 2022,
                "daemon_base": "/var/lib/pterodactyl/volumes",
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": "2024-01-01T00:00:00+00:00"
            }
        })
    }

    fn loaded(api: &ApplicationClient, scheme: &str) -> Node {
        let attributes =
            serde_json::from_value(node_json(1, scheme)["attributes"].clone()).unwrap();
        Node::from_attributes(api.panel().clone(), attributes)
    }

    #[test]
    fn unloaded_accessors_use_defaults() {
        let api = ApplicationClient::new("https://panel.example.com", "key").unwrap();
        let node = Node::new(api.panel().clone());
        assert_eq!(node.scheme(), "https");
        assert!(!node.is_public());
        assert!(!node.is_in_maintenance_mode());
        assert_eq!(node.memory(), None);
        assert_eq!(node.allocated_resources(), AllocatedResources::default());
        assert!(node.allocations().is_err());
    }

    #[test]
    fn loaded_accessors() {
        let api = ApplicationClient::new("https://panel.example.com", "key").unwrap();
        let node = loaded(&api, "http");
        assert_eq!(node.scheme(), "http");
        assert!(node.is_public());
        assert_eq!(node.fqdn().as_deref(), Some("node1.example.com"));
        assert_eq!(node.disk(), Some(102_400));
        assert_eq!(loaded(&api, "").scheme(), "https");
    }

    #[tokio::test]
    async fn configuration_from_manager_and_wrapper() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/application/nodes/1/configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "debug": false,
                "uuid": "1046d1d1-b8ef-4771-82b1-2b5946d33397",
                "api": { "host": "0.0.0.0", "port": 8080 }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let from_manager = api.nodes().configuration(1).await.unwrap();
        let from_wrapper = loaded(&api, "https").configuration().await.unwrap();
        assert_eq!(from_manager, from_wrapper);
        assert_eq!(from_manager["api"]["port"], json!(8080));
    }

    #[tokio::test]
    async fn maintenance_toggle_updates_state() {
        let server = MockServer::start().await;
        let mut updated = node_json(1, "https");
        updated["attributes"]["maintenance_mode"] = json!(true);
        Mock::given(method("PATCH"))
            .and(path("/api/application/nodes/1"))
            .and(body_json(json!({ "maintenance_mode": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let node = loaded(&api, "https");
        node.update(&UpdateNodeRequest {
            maintenance_mode: Some(true),
            ..UpdateNodeRequest::default()
        })
        .await
        .unwrap();
        assert!(node.is_in_maintenance_mode());
    }

    #[tokio::test]
    async fn allocations_sub_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/application/nodes/1/allocations"))
            .and(query_param("per_page", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{
                    "object": "allocation",
                    "attributes": {
                        "id": 7, "ip": "10.0.0.5", "alias": null,
                        "port": 25565, "notes": null, "assigned": false
                    }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/application/nodes/1/allocations"))
            .and(body_json(json!({ "ip": "10.0.0.5", "ports": ["25566-25570"] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/application/nodes/1/allocations/7"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let allocations = loaded(&api, "https").allocations().unwrap();

        let listed = allocations
            .list(&ListParams::new().per_page(50))
            .await
            .unwrap();
        assert_eq!(listed[0].port, 25565);

        allocations
            .create(&CreateAllocationRequest {
                ip: "10.0.0.5".to_string(),
                ports: vec!["25566-25570".to_string()],
                alias: None,
            })
            .await
            .unwrap();

        let err = allocations.delete(7).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
