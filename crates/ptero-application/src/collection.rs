//! Plumbing shared by every collection manager and entity wrapper.
//!
//! A [`Collection`] binds one resource path to the shared [`PanelClient`] and
//! owns that manager's [`RateLimitedQueue`]. Reads go straight to the panel;
//! `create` and `delete` are pushed onto the queue at call time.

use futures::future::{join_all, try_join_all, JoinAll, TryJoinAll};
use ptero_core::entity::{require_id, update_payload, EntityCell, Identified};
use ptero_core::types::{Item, ListParams, ListResponse};
use ptero_core::{ErrorContext, PanelClient, Queued, RateLimitedQueue, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use tracing::debug;

/// Fail-fast aggregate of queued operations.
pub type BulkResult<T> = TryJoinAll<Queued<T>>;

/// Aggregate of queued operations that reports every outcome.
pub type BulkSettled<T> = JoinAll<Queued<T>>;

#[derive(Debug, Clone)]
pub(crate) struct Collection {
    client: PanelClient,
    queue: RateLimitedQueue,
    path: String,
    resource: &'static str,
}

impl Collection {
    pub(crate) fn new(
        client: PanelClient,
        queue_name: &'static str,
        path: impl Into<String>,
        resource: &'static str,
    ) -> Self {
        let queue = client.queue(queue_name);
        Self::with_queue(client, queue, path, resource)
    }

    /// Bind to a lane owned elsewhere, such as a keyed lane shared per parent.
    pub(crate) fn with_queue(
        client: PanelClient,
        queue: RateLimitedQueue,
        path: impl Into<String>,
        resource: &'static str,
    ) -> Self {
        Self {
            client,
            queue,
            path: path.into(),
            resource,
        }
    }

    pub(crate) fn client(&self) -> &PanelClient {
        &self.client
    }

    pub(crate) fn queue(&self) -> &RateLimitedQueue {
        &self.queue
    }

    pub(crate) fn item_path(&self, id: impl Display) -> String {
        format!("{}/{id}", self.path)
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(self.resource)
    }

    pub(crate) async fn list<A>(&self, params: &ListParams) -> Result<ListResponse<A>>
    where
        A: DeserializeOwned,
    {
        let context = self.context().action(format!("listing {}", self.path));
        self.client
            .get_json(&self.path, params.to_pairs(), &context)
            .await
    }

    /// Follow pagination until the last page.
    pub(crate) async fn list_all<A>(&self, params: &ListParams) -> Result<Vec<A>>
    where
        A: DeserializeOwned,
    {
        let mut params = params.clone();
        let mut page = params.page.unwrap_or(1);
        let mut items = Vec::new();

        loop {
            params.page = Some(page);
            let response: ListResponse<A> = self.list(&params).await?;
            let more = response.has_next_page();
            items.extend(response.into_attributes());
            if !more {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    pub(crate) async fn get<A>(&self, id: u64) -> Result<A>
    where
        A: DeserializeOwned,
    {
        self.get_at(&self.item_path(id), self.context().identifier(id)).await
    }

    pub(crate) async fn get_at<A>(&self, path: &str, context: ErrorContext) -> Result<A>
    where
        A: DeserializeOwned,
    {
        let item: Item<A> = self.client.get_json(path, Vec::new(), &context).await?;
        Ok(item.into_attributes())
    }

    /// Queue a POST to the collection path and wrap the created attributes.
    pub(crate) fn create<A, E, B>(&self, body: B, wrap: fn(PanelClient, A) -> E) -> Queued<E>
    where
        A: DeserializeOwned + Send + 'static,
        E: Send + 'static,
        B: Serialize + Send + 'static,
    {
        let client = self.client.clone();
        let path = self.path.clone();
        let context = self.context().action("creating");
        debug!(resource = self.resource, "queueing create");

        self.queue.enqueue(move || async move {
            let payload = serde_json::to_value(&body)?;
            let item: Item<A> = client
                .send_json(Method::POST, &path, Some(&payload), &context)
                .await?;
            Ok(wrap(client, item.into_attributes()))
        })
    }

    /// Queue a DELETE of `{path}/{id}`.
    pub(crate) fn delete(&self, id: u64) -> Queued<()> {
        self.delete_at_then(self.item_path(id), id, || ())
    }

    /// Queue a DELETE of `{path}/{id}` and run `on_success` once the panel accepts it.
    pub(crate) fn delete_then<F>(&self, id: u64, on_success: F) -> Queued<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.delete_at_then(self.item_path(id), id, on_success)
    }

    /// Queue a DELETE of an arbitrary path belonging to `id`.
    pub(crate) fn delete_at(&self, path: String, id: u64) -> Queued<()> {
        self.delete_at_then(path, id, || ())
    }

    fn delete_at_then<F>(&self, path: String, id: u64, on_success: F) -> Queued<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let client = self.client.clone();
        let context = self.context().identifier(id).action("deleting");
        debug!(resource = self.resource, id, "queueing delete");

        self.queue.enqueue(move || async move {
            client
                .send_empty(Method::DELETE, &path, None, &context)
                .await?;
            on_success();
            Ok(())
        })
    }

    pub(crate) fn bulk_create<A, E, B, I>(
        &self,
        bodies: I,
        wrap: fn(PanelClient, A) -> E,
    ) -> BulkResult<E>
    where
        A: DeserializeOwned + Send + 'static,
        E: Send + 'static,
        B: Serialize + Send + 'static,
        I: IntoIterator<Item = B>,
    {
        let tickets: Vec<_> = bodies.into_iter().map(|body| self.create(body, wrap)).collect();
        try_join_all(tickets)
    }

    pub(crate) fn bulk_create_settled<A, E, B, I>(
        &self,
        bodies: I,
        wrap: fn(PanelClient, A) -> E,
    ) -> BulkSettled<E>
    where
        A: DeserializeOwned + Send + 'static,
        E: Send + 'static,
        B: Serialize + Send + 'static,
        I: IntoIterator<Item = B>,
    {
        let tickets: Vec<_> = bodies.into_iter().map(|body| self.create(body, wrap)).collect();
        join_all(tickets)
    }

    pub(crate) fn bulk_delete<I>(&self, ids: I) -> BulkResult<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let tickets: Vec<_> = ids.into_iter().map(|id| self.delete(id)).collect();
        try_join_all(tickets)
    }

    pub(crate) fn bulk_delete_settled<I>(&self, ids: I) -> BulkSettled<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let tickets: Vec<_> = ids.into_iter().map(|id| self.delete(id)).collect();
        join_all(tickets)
    }
}

// Entity wrapper verbs. All of them are direct calls; none touch a queue.

/// GET `path` and replace the cell with the returned attributes.
pub(crate) async fn load<A>(
    client: &PanelClient,
    cell: &EntityCell<A>,
    path: &str,
    context: &ErrorContext,
) -> Result<()>
where
    A: DeserializeOwned + Clone,
{
    let item: Item<A> = client.get_json(path, Vec::new(), context).await?;
    cell.replace(item.into_attributes());
    Ok(())
}

/// Resolve the id, build `path`, and reload from it.
pub(crate) async fn refresh<A>(
    client: &PanelClient,
    cell: &EntityCell<A>,
    resource: &str,
    path: impl FnOnce(u64) -> String,
) -> Result<()>
where
    A: DeserializeOwned + Clone + Identified,
{
    let id = require_id(cell, resource)?;
    load(client, cell, &path(id), &ErrorContext::new(resource).identifier(id)).await
}

/// PATCH a partial update and replace the cell with the response.
///
/// Both preconditions (loaded id, non-empty change set) are checked before any I/O.
pub(crate) async fn patch<A, T>(
    client: &PanelClient,
    cell: &EntityCell<A>,
    resource: &str,
    path: impl FnOnce(u64) -> String,
    changes: &T,
) -> Result<()>
where
    A: DeserializeOwned + Clone + Identified,
    T: Serialize + ?Sized,
{
    let id = require_id(cell, resource)?;
    let body = update_payload(changes)?;
    let context = ErrorContext::new(resource).identifier(id).action("updating");
    let item: Item<A> = client
        .send_json(Method::PATCH, &path(id), Some(&body), &context)
        .await?;
    cell.replace(item.into_attributes());
    Ok(())
}

/// DELETE the entity and reset the cell to unloaded.
pub(crate) async fn remove<A>(
    client: &PanelClient,
    cell: &EntityCell<A>,
    resource: &str,
    path: impl FnOnce(u64) -> String,
) -> Result<()>
where
    A: Clone + Identified,
{
    let id = require_id(cell, resource)?;
    let context = ErrorContext::new(resource).identifier(id).action("deleting");
    client
        .send_empty(Method::DELETE, &path(id), None, &context)
        .await?;
    cell.clear();
    Ok(())
}
