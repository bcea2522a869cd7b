//! Panel nests: the [`Nests`] manager and the [`Nest`] wrapper.

use futures::future::{join_all, try_join_all};
use ptero_core::entity::{require_id, EntityCell, EntityState, Identified};
use ptero_core::types::ListParams;
use ptero_core::{ErrorContext, PanelClient, Queued, RateLimitedQueue, Result};

use crate::collection::{self, BulkResult, BulkSettled, Collection};
use crate::eggs::{Eggs, EGG_LANE};
use crate::models::{CreateNestRequest, EggAttributes, NestAttributes, UpdateNestRequest};

const RESOURCE: &str = "Nest";

fn nest_path(id: u64) -> String {
    format!("/nests/{id}")
}

impl Identified for NestAttributes {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Collection manager for `/nests`.
///
/// Also hands out [`Eggs`] managers. Every manager for the same nest shares one
/// queue; deleting the nest releases it.
#[derive(Debug, Clone)]
pub struct Nests {
    inner: Collection,
}

impl Nests {
    /// Create a manager with its own request queue.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            inner: Collection::new(client, "nests", "/nests", RESOURCE),
        }
    }

    /// Queue used for create and delete.
    #[must_use]
    pub fn queue(&self) -> &RateLimitedQueue {
        self.inner.queue()
    }

    /// Eggs manager for `nest_id` on that nest's shared queue.
    #[must_use]
    pub fn eggs(&self, nest_id: u64) -> Eggs {
        Eggs::new(self.inner.client().clone(), nest_id)
    }

    /// Fetch one page of nests.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<Nest>> {
        let page = self.inner.list::<NestAttributes>(params).await?;
        Ok(self.wrap_all(page.into_attributes()))
    }

    /// Fetch every page of nests.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<Nest>> {
        let nests = self.inner.list_all(params).await?;
        Ok(self.wrap_all(nests))
    }

    /// Fetch a nest by id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: u64) -> Result<Nest> {
        let attributes = self.inner.get(id).await?;
        Ok(Nest::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Queue the creation of a nest.
    pub fn create(&self, request: CreateNestRequest) -> Queued<Nest> {
        self.inner.create(request, Nest::from_attributes)
    }

    /// Queue the deletion of a nest; its egg queue is released once the panel
    /// accepts the delete.
    pub fn delete(&self, id: u64) -> Queued<()> {
        let client = self.inner.client().clone();
        self.inner.delete_then(id, move || client.release_queue(EGG_LANE, id))
    }

    /// Queue several creations; fails on the first rejected one.
    pub fn bulk_create(&self, requests: Vec<CreateNestRequest>) -> BulkResult<Nest> {
        self.inner.bulk_create(requests, Nest::from_attributes)
    }

    /// Queue several creations and report every outcome in input order.
    pub fn bulk_create_settled(&self, requests: Vec<CreateNestRequest>) -> BulkSettled<Nest> {
        self.inner.bulk_create_settled(requests, Nest::from_attributes)
    }

    /// Queue several deletions; fails on the first rejected one.
    pub fn bulk_delete(&self, ids: impl IntoIterator<Item = u64>) -> BulkResult<()> {
        try_join_all(ids.into_iter().map(|id| self.delete(id)).collect::<Vec<_>>())
    }

    /// Queue several deletions and report every outcome in input order.
    pub fn bulk_delete_settled(&self, ids: impl IntoIterator<Item = u64>) -> BulkSettled<()> {
        join_all(ids.into_iter().map(|id| self.delete(id)).collect::<Vec<_>>())
    }

    fn wrap_all(&self, nests: Vec<NestAttributes>) -> Vec<Nest> {
        nests
            .into_iter()
            .map(|attributes| Nest::from_attributes(self.inner.client().clone(), attributes))
            .collect()
    }
}

/// A single nest.
#[derive(Debug, Clone)]
pub struct Nest {
    client: PanelClient,
    state: EntityCell<NestAttributes>,
}

impl Nest {
    /// Unloaded wrapper; call [`Nest::fetch`] to populate it.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            client,
            state: EntityCell::unloaded(),
        }
    }

    /// Wrapper around attributes received from the panel.
    #[must_use]
    pub fn from_attributes(client: PanelClient, attributes: NestAttributes) -> Self {
        Self {
            client,
            state: EntityCell::loaded(attributes),
        }
    }

    /// Load nest `id` into this wrapper.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error; the wrapper is unchanged on failure.
    pub async fn fetch(&self, id: u64) -> Result<()> {
        let context = ErrorContext::new(RESOURCE).identifier(id);
        collection::load(&self.client, &self.state, &nest_path(id), &context).await
    }

    /// Reload the current nest.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn refresh(&self) -> Result<()> {
        collection::refresh(&self.client, &self.state, RESOURCE, nest_path).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update(&self, changes: &UpdateNestRequest) -> Result<()> {
        collection::patch(&self.client, &self.state, RESOURCE, nest_path, changes).await
    }

    /// Delete the nest, release its egg queue and unload the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn delete(&self) -> Result<()> {
        let id = require_id(&self.state, RESOURCE)?;
        collection::remove(&self.client, &self.state, RESOURCE, nest_path).await?;
        self.client.release_queue(EGG_LANE, id);
        Ok(())
    }

    /// Eggs manager for this nest, sharing the queue of every other manager for
    /// the same nest.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded.
    pub fn eggs(&self) -> Result<Eggs> {
        let id = require_id(&self.state, RESOURCE)?;
        Ok(Eggs::new(self.client.clone(), id))
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> EntityState<NestAttributes> {
        self.state.snapshot()
    }

    /// Copy of the loaded attributes.
    #[must_use]
    pub fn attributes(&self) -> Option<NestAttributes> {
        self.state.attributes()
    }

    /// Nest id.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.state.read(|a| a.id)
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.state.read(|a| a.name.clone())
    }

    /// Author email.
    #[must_use]
    pub fn author(&self) -> Option<String> {
        self.state.read(|a| a.author.clone())
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.state.read(|a| a.description.clone()).flatten()
    }

    /// Eggs included with `include=eggs`; empty otherwise.
    #[must_use]
    pub fn egg_attributes(&self) -> Vec<EggAttributes> {
        self.state
            .read(|a| {
                a.relationships
                    .as_ref()
                    .and_then(|r| r.eggs.clone())
                    .map(|list| list.into_attributes())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApplicationClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(start_paused = true)]
    async fn eggs_managers_share_queue_per_nest() {
        let api = ApplicationClient::new("https://panel.example.com", "key").unwrap();
        let first = api.nests().eggs(4);
        let again = api.eggs(4);
        let other = api.eggs(5);
        assert_eq!(again.nest_id(), 4);
        assert_eq!(other.nest_id(), 5);

        let ticket = first.queue().enqueue(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            Ok(())
        });
        assert!(again.queue().is_draining());
        assert!(!other.queue().is_draining());
        ticket.await.unwrap();
    }

    #[tokio::test]
    async fn wrapper_delete_releases_egg_queue() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/application/nests/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let nest = Nest::from_attributes(
            api.panel().clone(),
            serde_json::from_value(json!({
                "id": 3,
                "uuid": "58aa9e05-d4b0-4cf4-b16e-bf2ac06a49c5",
                "author": "support@pterodactyl.io",
                "name": "Rust",
                "created_at": "2024-01-01T00:00:00+00:00"
            }))
            .unwrap(),
        );
        let _ = nest.eggs().unwrap();
        assert_eq!(api.panel().keyed_queue_count(), 1);

        nest.delete().await.unwrap();
        assert_eq!(api.panel().keyed_queue_count(), 0);
        assert!(nest.id().is_none());
    }

    #[test]
    fn unloaded_nest_has_no_eggs_manager() {
        let api = ApplicationClient::new("https://panel.example.com", "key").unwrap();
        assert!(Nest::new(api.panel().clone()).eggs().is_err());
    }

    #[tokio::test]
    async fn fetch_with_included_eggs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/application/nests/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "nest",
                "attributes": {
                    "id": 1,
                    "uuid": "58aa9e05-d4b0-4cf4-b16e-bf2ac06a49c5",
                    "author": "support@pterodactyl.io",
                    "name": "Minecraft",
                    "description": "Minecraft - the classic game from Mojang.",
                    "created_at": "2024-01-01T00:00:00+00:00",
                    "updated_at": "2024-01-01T00:00:00+00:00",
                    "relationships": {
                        "eggs": {
                            "object": "list",
                            "data": [{
                                "object": "egg",
                                "attributes": {
                                    "id": 5,
                                    "uuid": "fcc3c7ca-5d4a-4e1d-9d6f-6d5ec6a9a3c5",
                                    "name": "Vanilla",
                                    "nest": 1,
                                    "author": "support@pterodactyl.io",
                                    "description": null,
                                    "docker_image": "ghcr.io/pterodactyl/yolks:java_17",
                                    "startup": "java -jar server.jar",
                                    "created_at": "2024-01-01T00:00:00+00:00",
                                    "updated_at": null
                                }
                            }]
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let nest = Nest::new(api.panel().clone());
        nest.fetch(1).await.unwrap();

        assert_eq!(nest.name().as_deref(), Some("Minecraft"));
        assert_eq!(nest.author().as_deref(), Some("support@pterodactyl.io"));
        let eggs = nest.egg_attributes();
        assert_eq!(eggs.len(), 1);
        assert_eq!(eggs[0].name, "Vanilla");
        assert_eq!(nest.eggs().unwrap().nest_id(), 1);
    }
}
