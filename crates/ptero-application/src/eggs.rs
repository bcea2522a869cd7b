//! Eggs of a nest: the [`Eggs`] manager and the [`Egg`] wrapper.
//!
//! Eggs live under `/nests/{nest}/eggs`, so every manager is bound to one nest.
//! All managers for the same nest on one client share that nest's queue.

use ptero_core::entity::{EntityCell, EntityState, Identified};
use ptero_core::types::ListParams;
use ptero_core::{ErrorContext, PanelClient, Queued, RateLimitedQueue, Result};
use std::collections::HashMap;

use crate::collection::{self, BulkResult, BulkSettled, Collection};
use crate::models::{CreateEggRequest, EggAttributes, EggVariableAttributes, UpdateEggRequest};

const RESOURCE: &str = "Egg";

/// Name of the per-nest lane in the client's keyed queue registry.
pub(crate) const EGG_LANE: &str = "eggs";

impl Identified for EggAttributes {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Collection manager for `/nests/{nest}/eggs`.
#[derive(Debug, Clone)]
pub struct Eggs {
    inner: Collection,
    nest_id: u64,
}

impl Eggs {
    /// Create a manager for `nest_id` on that nest's shared request queue.
    #[must_use]
    pub fn new(client: PanelClient, nest_id: u64) -> Self {
        let queue = client.keyed_queue(EGG_LANE, nest_id);
        let path = format!("/nests/{nest_id}/eggs");
        Self {
            inner: Collection::with_queue(client, queue, path, RESOURCE),
            nest_id,
        }
    }

    /// Nest this manager is bound to.
    #[must_use]
    pub const fn nest_id(&self) -> u64 {
        self.nest_id
    }

    /// Queue used for create and delete.
    #[must_use]
    pub fn queue(&self) -> &RateLimitedQueue {
        self.inner.queue()
    }

    /// Fetch one page of eggs.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<Egg>> {
        let page = self.inner.list::<EggAttributes>(params).await?;
        Ok(self.wrap_all(page.into_attributes()))
    }

    /// Fetch every page of eggs.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<Egg>> {
        let eggs = self.inner.list_all(params).await?;
        Ok(self.wrap_all(eggs))
    }

    /// Fetch an egg by id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: u64) -> Result<Egg> {
        let attributes = self.inner.get(id).await?;
        Ok(Egg::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Queue the creation of an egg.
    pub fn create(&self, request: CreateEggRequest) -> Queued<Egg> {
        self.inner.create(request, Egg::from_attributes)
    }

    /// Queue the deletion of an egg.
    pub fn delete(&self, id: u64) -> Queued<()> {
        self.inner.delete(id)
    }

    /// Queue several creations; fails on the first rejected one.
    pub fn bulk_create(&self, requests: Vec<CreateEggRequest>) -> BulkResult<Egg> {
        self.inner.bulk_create(requests, Egg::from_attributes)
    }

    /// Queue several creations and report every outcome in input order.
    pub fn bulk_create_settled(&self, requests: Vec<CreateEggRequest>) -> BulkSettled<Egg> {
        self.inner.bulk_create_settled(requests, Egg::from_attributes)
    }

    /// Queue several deletions; fails on the first rejected one.
    pub fn bulk_delete(&self, ids: impl IntoIterator<Item = u64>) -> BulkResult<()> {
        self.inner.bulk_delete(ids)
    }

    /// Queue several deletions and report every outcome in input order.
    pub fn bulk_delete_settled(&self, ids: impl IntoIterator<Item = u64>) -> BulkSettled<()> {
        self.inner.bulk_delete_settled(ids)
    }

    fn wrap_all(&self, eggs: Vec<EggAttributes>) -> Vec<Egg> {
        eggs.into_iter()
            .map(|attributes| Egg::from_attributes(self.inner.client().clone(), attributes))
            .collect()
    }
}

/// A single egg.
#[derive(Debug, Clone)]
pub struct Egg {
    client: PanelClient,
    state: EntityCell<EggAttributes>,
}

impl Egg {
    /// Unloaded wrapper; call [`Egg::fetch`] to populate it.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            client,
            state: EntityCell::unloaded(),
        }
    }

    /// Wrapper around attributes received from the panel.
    #[must_use]
    pub fn from_attributes(client: PanelClient, attributes: EggAttributes) -> Self {
        Self {
            client,
            state: EntityCell::loaded(attributes),
        }
    }

    /// Load egg `id` of nest `nest_id` into this wrapper.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error; the wrapper is unchanged on failure.
    pub async fn fetch(&self, nest_id: u64, id: u64) -> Result<()> {
        let context = ErrorContext::new(RESOURCE).identifier(id);
        let path = format!("/nests/{nest_id}/eggs/{id}");
        collection::load(&self.client, &self.state, &path, &context).await
    }

    /// Reload the current egg.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn refresh(&self) -> Result<()> {
        let nest = self.nest_id().unwrap_or_default();
        let path = |id: u64| format!("/nests/{nest}/eggs/{id}");
        collection::refresh(&self.client, &self.state, RESOURCE, path).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update(&self, changes: &UpdateEggRequest) -> Result<()> {
        let nest = self.nest_id().unwrap_or_default();
        let path = |id: u64| format!("/nests/{nest}/eggs/{id}");
        collection::patch(&self.client, &self.state, RESOURCE, path, changes).await
    }

    /// Delete the egg and unload the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn delete(&self) -> Result<()> {
        let nest = self.nest_id().unwrap_or_default();
        let path = |id: u64| format!("/nests/{nest}/eggs/{id}");
        collection::remove(&self.client, &self.state, RESOURCE, path).await
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> EntityState<EggAttributes> {
        self.state.snapshot()
    }

    /// Copy of the loaded attributes.
    #[must_use]
    pub fn attributes(&self) -> Option<EggAttributes> {
        self.state.attributes()
    }

    /// Egg id.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.state.read(|a| a.id)
    }

    /// Owning nest id.
    #[must_use]
    pub fn nest_id(&self) -> Option<u64> {
        self.state.read(|a| a.nest)
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.state.read(|a| a.name.clone())
    }

    /// Default docker image.
    #[must_use]
    pub fn docker_image(&self) -> Option<String> {
        self.state.read(|a| a.docker_image.clone())
    }

    /// Selectable docker images; empty when unloaded.
    #[must_use]
    pub fn docker_images(&self) -> HashMap<String, String> {
        self.state
            .read(|a| a.docker_images.clone())
            .unwrap_or_default()
    }

    /// Startup command template.
    #[must_use]
    pub fn startup(&self) -> Option<String> {
        self.state.read(|a| a.startup.clone())
    }

    /// Variables, present when fetched with `include=variables`.
    #[must_use]
    pub fn variables(&self) -> Vec<EggVariableAttributes> {
        self.state
            .read(|a| {
                a.relationships
                    .as_ref()
                    .and_then(|r| r.variables.clone())
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
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn egg_json(id: u64, nest: u64) -> Value {
        json!({
            "object": "egg",
            "attributes": {
                "id": id,
                "uuid": "fcc3c7ca-5d4a-4e1d-9d6f-6d5ec6a9a3c5",
                "name": "Paper",
                "nest": nest,
                "author": "parker@pterodactyl.io",
                "description": "High performance Spigot fork.",
                "docker_image": "ghcr.io/pterodactyl/yolks:java_17",
                "docker_images": { "Java 17": "ghcr.io/pterodactyl/yolks:java_17" },
                "config": {
                    "files": {},
                    "startup": { "done": ")! For help," },
                    "stop": "stop",
                    "logs": {},
                    "extends": null
                },
                "startup": "java -jar {{SERVER_JARFILE}}",
                "script": {
                    "privileged": true,
                    "install": "#!/bin/ash",
                    "entry": "ash",
                    "container": "alpine",
                    "extends": null
                },
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": "2024-01-01T00:00:00+00:00",
                "relationships": {
                    "variables": {
                        "object": "list",
                        "data": [{
                            "object": "egg_variable",
                            "attributes": {
                                "id": 1, "egg_id": id, "name": "Server Jar File",
                                "description": "", "env_variable": "SERVER_JARFILE",
                                "default_value": "server.jar", "user_viewable": true,
                                "user_editable": true, "rules": "required|string",
                                "created_at": "2024-01-01T00:00:00+00:00",
                                "updated_at": "2024-01-01T00:00:00+00:00"
                            }
                        }]
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn eggs_are_scoped_to_their_nest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/application/nests/2/eggs/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(egg_json(3, 2)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/application/nests/2/eggs"))
            .and(query_param("include", "variables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [egg_json(3, 2)]
            })))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let eggs = api.eggs(2);
        assert_eq!(eggs.nest_id(), 2);

        let listed = eggs
            .list(&ListParams::new().include("variables"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let egg = listed.into_iter().next().unwrap();
        assert_eq!(egg.nest_id(), Some(2));
        assert_eq!(egg.docker_images().len(), 1);
        assert_eq!(egg.variables()[0].env_variable, "SERVER_JARFILE");

        let fetched = eggs.get(3).await.unwrap();
        assert_eq!(fetched.startup().as_deref(), Some("java -jar {{SERVER_JARFILE}}"));
    }

    #[tokio::test]
    async fn update_uses_nest_scoped_path() {
        let server = MockServer::start().await;
        let mut updated = egg_json(3, 2);
        updated["attributes"]["name"] = json!("Paper 1.20");
        Mock::given(method("PATCH"))
            .and(path("/api/application/nests/2/eggs/3"))
            .and(body_json(json!({ "name": "Paper 1.20" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let attributes = serde_json::from_value(egg_json(3, 2)["attributes"].clone()).unwrap();
        let egg = Egg::from_attributes(api.panel().clone(), attributes);
        egg.update(&UpdateEggRequest {
            name: Some("Paper 1.20".to_string()),
            ..UpdateEggRequest::default()
        })
        .await
        .unwrap();
        assert_eq!(egg.name().as_deref(), Some("Paper 1.20"));
    }

    #[test]
    fn unloaded_egg_defaults() {
        let api = ApplicationClient::new("https://panel.example.com", "key").unwrap();
        let egg = Egg::new(api.panel().clone());
        assert!(egg.variables().is_empty());
        assert!(egg.docker_images().is_empty());
        assert_eq!(egg.name(), None);
    }
}
