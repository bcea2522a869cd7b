//! Panel servers: the [`Servers`] manager, the [`Server`] wrapper and the
//! per-server [`ServerDatabases`] sub-API.

use chrono::{DateTime, Utc};
use ptero_core::entity::{require_id, EntityCell, EntityState, Identified};
use ptero_core::types::{Item, ListParams, ListResponse};
use ptero_core::{ErrorContext, PanelClient, Queued, RateLimitedQueue, Result};
use reqwest::Method;

use crate::collection::{self, BulkResult, BulkSettled, Collection};
use crate::filter::{FieldValue, Filter, Filterable};
use crate::models::{
    CreateDatabaseRequest, CreateServerRequest, DatabaseAttributes, ServerAttributes,
    ServerLimits, UpdateServerBuildRequest, UpdateServerDetailsRequest,
    UpdateServerStartupRequest,
};

const RESOURCE: &str = "Server";

fn server_path(id: u64) -> String {
    format!("/servers/{id}")
}

impl Identified for ServerAttributes {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Collection manager for `/servers`.
#[derive(Debug, Clone)]
pub struct Servers {
    inner: Collection,
}

impl Servers {
    /// Create a manager with its own request queue.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            inner: Collection::new(client, "servers", "/servers", RESOURCE),
        }
    }

    /// Queue used for create and delete.
    #[must_use]
    pub fn queue(&self) -> &RateLimitedQueue {
        self.inner.queue()
    }

    /// Fetch one page of servers.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<Server>> {
        let page = self.inner.list::<ServerAttributes>(params).await?;
        Ok(self.wrap_all(page.into_attributes()))
    }

    /// Fetch every page of servers.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<Server>> {
        let servers = self.inner.list_all(params).await?;
        Ok(self.wrap_all(servers))
    }

    /// Fetch a server by panel id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: u64) -> Result<Server> {
        let attributes = self.inner.get(id).await?;
        Ok(Server::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Fetch a server by external id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get_external(&self, external_id: &str) -> Result<Server> {
        let path = format!("/servers/external/{external_id}");
        let context = ErrorContext::new(RESOURCE).identifier(external_id);
        let attributes = self.inner.get_at(&path, context).await?;
        Ok(Server::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Queue the creation of a server.
    pub fn create(&self, request: CreateServerRequest) -> Queued<Server> {
        self.inner.create(request, Server::from_attributes)
    }

    /// Queue the deletion of a server.
    pub fn delete(&self, id: u64) -> Queued<()> {
        self.inner.delete(id)
    }

    /// Queue a forced deletion, skipping daemon-side cleanup.
    pub fn force_delete(&self, id: u64) -> Queued<()> {
        self.inner.delete_at(format!("{}/force", server_path(id)), id)
    }

    /// Queue several creations; fails on the first rejected one.
    pub fn bulk_create(&self, requests: Vec<CreateServerRequest>) -> BulkResult<Server> {
        self.inner.bulk_create(requests, Server::from_attributes)
    }

    /// Queue several creations and report every outcome in input order.
    pub fn bulk_create_settled(&self, requests: Vec<CreateServerRequest>) -> BulkSettled<Server> {
        self.inner
            .bulk_create_settled(requests, Server::from_attributes)
    }

    /// Queue several deletions; fails on the first rejected one.
    pub fn bulk_delete(&self, ids: impl IntoIterator<Item = u64>) -> BulkResult<()> {
        self.inner.bulk_delete(ids)
    }

    /// Queue several deletions and report every outcome in input order.
    pub fn bulk_delete_settled(&self, ids: impl IntoIterator<Item = u64>) -> BulkSettled<()> {
        self.inner.bulk_delete_settled(ids)
    }

    /// Start an in-memory filter over `servers`.
    #[must_use]
    pub fn filter(&self, servers: &[Server]) -> Filter<Server> {
        Filter::new(servers)
    }

    fn wrap_all(&self, servers: Vec<ServerAttributes>) -> Vec<Server> {
        servers
            .into_iter()
            .map(|attributes| Server::from_attributes(self.inner.client().clone(), attributes))
            .collect()
    }
}

/// A single panel server.
#[derive(Debug, Clone)]
pub struct Server {
    client: PanelClient,
    state: EntityCell<ServerAttributes>,
}

impl Server {
    /// Unloaded wrapper; call [`Server::fetch`] to populate it.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            client,
            state: EntityCell::unloaded(),
        }
    }

    /// Wrapper around attributes received from the panel.
    #[must_use]
    pub fn from_attributes(client: PanelClient, attributes: ServerAttributes) -> Self {
        Self {
            client,
            state: EntityCell::loaded(attributes),
        }
    }

    /// Load server `id` into this wrapper.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error; the wrapper is unchanged on failure.
    pub async fn fetch(&self, id: u64) -> Result<()> {
        let context = ErrorContext::new(RESOURCE).identifier(id);
        collection::load(&self.client, &self.state, &server_path(id), &context).await
    }

    /// Reload the current server.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn refresh(&self) -> Result<()> {
        collection::refresh(&self.client, &self.state, RESOURCE, server_path).await
    }

    /// Update name, owner, external id or description.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update_details(&self, changes: &UpdateServerDetailsRequest) -> Result<()> {
        let path = |id: u64| format!("/servers/{id}/details");
        collection::patch(&self.client, &self.state, RESOURCE, path, changes).await
    }

    /// Update limits and allocations.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update_build(&self, changes: &UpdateServerBuildRequest) -> Result<()> {
        let path = |id: u64| format!("/servers/{id}/build");
        collection::patch(&self.client, &self.state, RESOURCE, path, changes).await
    }

    /// Update the startup command, egg or image.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update_startup(&self, changes: &UpdateServerStartupRequest) -> Result<()> {
        let path = |id: u64| format!("/servers/{id}/startup");
        collection::patch(&self.client, &self.state, RESOURCE, path, changes).await
    }

    /// Suspend the server; the local flag flips once the panel confirms.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn suspend(&self) -> Result<()> {
        self.action("suspend").await?;
        self.state.update(|a| a.suspended = true);
        Ok(())
    }

    /// Unsuspend the server; the local flag flips once the panel confirms.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn unsuspend(&self) -> Result<()> {
        self.action("unsuspend").await?;
        self.state.update(|a| a.suspended = false);
        Ok(())
    }

    /// Trigger a reinstall.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn reinstall(&self) -> Result<()> {
        self.action("reinstall").await
    }

    /// Delete the server and unload the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn delete(&self) -> Result<()> {
        collection::remove(&self.client, &self.state, RESOURCE, server_path).await
    }

    /// Force-delete the server and unload the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn force_delete(&self) -> Result<()> {
        collection::remove(&self.client, &self.state, RESOURCE, |id| {
            format!("/servers/{id}/force")
        })
        .await
    }

    /// Databases of this server.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded.
    pub fn databases(&self) -> Result<ServerDatabases> {
        let id = require_id(&self.state, RESOURCE)?;
        Ok(ServerDatabases {
            client: self.client.clone(),
            server_id: id,
        })
    }

    async fn action(&self, verb: &str) -> Result<()> {
        let id = require_id(&self.state, RESOURCE)?;
        let context = ErrorContext::new(RESOURCE)
            .identifier(id)
            .action(format!("{verb} server"));
        self.client
            .send_empty(Method::POST, &format!("/servers/{id}/{verb}"), None, &context)
            .await
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> EntityState<ServerAttributes> {
        self.state.snapshot()
    }

    /// Copy of the loaded attributes.
    #[must_use]
    pub fn attributes(&self) -> Option<ServerAttributes> {
        self.state.attributes()
    }

    /// Panel id.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.state.read(|a| a.id)
    }

    /// Short identifier used by the client API.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        self.state.read(|a| a.identifier.clone())
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.state.read(|a| a.name.clone())
    }

    /// Whether the server is suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.state.read(|a| a.suspended).unwrap_or(false)
    }

    /// Resource limits.
    #[must_use]
    pub fn limits(&self) -> Option<ServerLimits> {
        self.state.read(|a| a.limits.clone())
    }

    /// Owner user id.
    #[must_use]
    pub fn owner_id(&self) -> Option<u64> {
        self.state.read(|a| a.user)
    }
}

/// `/servers/{id}/databases` for one server. Calls are direct.
#[derive(Debug, Clone)]
pub struct ServerDatabases {
    client: PanelClient,
    server_id: u64,
}

impl ServerDatabases {
    fn path(&self) -> String {
        format!("/servers/{}/databases", self.server_id)
    }

    fn context(&self, database_id: Option<u64>) -> ErrorContext {
        match database_id {
            Some(id) => ErrorContext::new("Database").identifier(id),
            None => ErrorContext::new(RESOURCE).identifier(self.server_id),
        }
    }

    /// Server these databases belong to.
    #[must_use]
    pub const fn server_id(&self) -> u64 {
        self.server_id
    }

    /// List databases.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self) -> Result<Vec<DatabaseAttributes>> {
        let page: ListResponse<DatabaseAttributes> = self
            .client
            .get_json(&self.path(), Vec::new(), &self.context(None))
            .await?;
        Ok(page.into_attributes())
    }

    /// Fetch one database.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn get(&self, database_id: u64) -> Result<DatabaseAttributes> {
        let path = format!("{}/{database_id}", self.path());
        let item: Item<DatabaseAttributes> = self
            .client
            .get_json(&path, Vec::new(), &self.context(Some(database_id)))
            .await?;
        Ok(item.into_attributes())
    }

    /// Create a database.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn create(&self, request: &CreateDatabaseRequest) -> Result<DatabaseAttributes> {
        let body = serde_json::to_value(request)?;
        let context = self.context(None).action("creating database");
        let item: Item<DatabaseAttributes> = self
            .client
            .send_json(Method::POST, &self.path(), Some(&body), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Rotate the database password.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn reset_password(&self, database_id: u64) -> Result<()> {
        let path = format!("{}/{database_id}/reset-password", self.path());
        self.client
            .send_empty(Method::POST, &path, None, &self.context(Some(database_id)))
            .await
    }

    /// Delete a database.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn delete(&self, database_id: u64) -> Result<()> {
        let path = format!("{}/{database_id}", self.path());
        self.client
            .send_empty(Method::DELETE, &path, None, &self.context(Some(database_id)))
            .await
    }
}

/// Filterable server attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerField {
    /// `id`
    Id,
    /// `external_id`
    ExternalId,
    /// `uuid`
    Uuid,
    /// `identifier`
    Identifier,
    /// `name`
    Name,
    /// `description`
    Description,
    /// `suspended`
    Suspended,
    /// `user`
    User,
    /// `node`
    Node,
    /// `allocation`
    Allocation,
    /// `nest`
    Nest,
    /// `egg`
    Egg,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl Filterable for Server {
    type Field = ServerField;

    fn field(&self, field: ServerField) -> FieldValue {
        self.state
            .read(|a| match field {
                ServerField::Id => a.id.into(),
                ServerField::ExternalId => a.external_id.clone().into(),
                ServerField::Uuid => a.uuid.to_string().into(),
                ServerField::Identifier => a.identifier.clone().into(),
                ServerField::Name => a.name.clone().into(),
                ServerField::Description => a.description.clone().into(),
                ServerField::Suspended => a.suspended.into(),
                ServerField::User => a.user.into(),
                ServerField::Node => a.node.into(),
                ServerField::Allocation => a.allocation.into(),
                ServerField::Nest => a.nest.into(),
                ServerField::Egg => a.egg.into(),
                ServerField::CreatedAt => a.created_at.into(),
                ServerField::UpdatedAt => a.updated_at.into(),
            })
            .unwrap_or(FieldValue::Null)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.state.read(|a| a.created_at)
    }
}

impl Filter<Server> {
    /// Suspended servers only.
    #[must_use]
    pub fn suspended(self) -> Self {
        self.where_eq(ServerField::Suspended, true)
    }

    /// Servers that are not suspended.
    #[must_use]
    pub fn not_suspended(self) -> Self {
        self.where_eq(ServerField::Suspended, false)
    }

    /// Servers owned by `user_id`.
    #[must_use]
    pub fn by_user(self, user_id: u64) -> Self {
        self.where_eq(ServerField::User, user_id)
    }

    /// Servers on `node_id`.
    #[must_use]
    pub fn by_node(self, node_id: u64) -> Self {
        self.where_eq(ServerField::Node, node_id)
    }

    /// Servers in `nest_id`.
    #[must_use]
    pub fn by_nest(self, nest_id: u64) -> Self {
        self.where_eq(ServerField::Nest, nest_id)
    }

    /// Servers running `egg_id`.
    #[must_use]
    pub fn by_egg(self, egg_id: u64) -> Self {
        self.where_eq(ServerField::Egg, egg_id)
    }
}
