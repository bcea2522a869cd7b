//! Panel locations. Every call here goes straight to the panel.

use ptero_core::entity::update_payload;
use ptero_core::types::{Item, ListParams, ListResponse};
use ptero_core::{ErrorContext, PanelClient, Result};
use reqwest::Method;

use crate::models::{CreateLocationRequest, LocationAttributes, UpdateLocationRequest};

const RESOURCE: &str = "Location";

/// Access to `/locations`.
#[derive(Debug, Clone)]
pub struct Locations {
    client: PanelClient,
}

impl Locations {
    /// Bind to a panel client.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    /// Fetch one page of locations.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<LocationAttributes>> {
        let context = ErrorContext::new(RESOURCE).action("listing locations");
        let page: ListResponse<LocationAttributes> = self
            .client
            .get_json("/locations", params.to_pairs(), &context)
            .await?;
        Ok(page.into_attributes())
    }

    /// Fetch a location by id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: u64) -> Result<LocationAttributes> {
        let context = ErrorContext::new(RESOURCE).identifier(id);
        let item: Item<LocationAttributes> = self
            .client
            .get_json(&format!("/locations/{id}"), Vec::new(), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Create a location.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn create(&self, request: &CreateLocationRequest) -> Result<LocationAttributes> {
        let context = ErrorContext::new(RESOURCE).action("creating location");
        let item: Item<LocationAttributes> = self
            .client
            .send_json(Method::POST, "/locations", Some(request), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `changes` is empty, else the translated panel error.
    pub async fn update(
        &self,
        id: u64,
        changes: &UpdateLocationRequest,
    ) -> Result<LocationAttributes> {
        let body = update_payload(changes)?;
        let context = ErrorContext::new(RESOURCE).identifier(id).action("updating");
        let item: Item<LocationAttributes> = self
            .client
            .send_json(Method::PATCH, &format!("/locations/{id}"), Some(&body), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Delete a location.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let context = ErrorContext::new(RESOURCE).identifier(id).action("deleting");
        self.client
            .send_empty(Method::DELETE, &format!("/locations/{id}"), None, &context)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApplicationClient;
    use ptero_core::Error;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn location_json() -> serde_json::Value {
        json!({
            "object": "location",
            "attributes": {
                "id": 1,
                "short": "nyc",
                "long": "New York",
                "updated_at": "2024-01-01T00:00:00+00:00",
                "created_at": "2024-01-01T00:00:00+00:00"
            }
        })
    }

    #[tokio::test]
    async fn create_and_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/application/locations"))
            .and(body_json(json!({ "short": "nyc", "long": "New York" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(location_json()))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/application/locations/1"))
            .and(body_json(json!({ "long": "New York" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(location_json()))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let created = api
            .locations()
            .create(&CreateLocationRequest {
                short: "nyc".to_string(),
                long: Some("New York".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.short, "nyc");

        let updated = api
            .locations()
            .update(
                1,
                &UpdateLocationRequest {
                    long: Some("New York".to_string()),
                    ..UpdateLocationRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.long.as_deref(), Some("New York"));
    }

    #[tokio::test]
    async fn empty_update_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        let err = api
            .locations()
            .update(1, &UpdateLocationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn missing_location_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/application/locations/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errors": [{
                    "code": "NotFoundHttpException", "status": "404", "detail": "Not found"
                }]
            })))
            .mount(&server)
            .await;

        let api = ApplicationClient::new(server.uri(), "key").unwrap();
        match api.locations().get(9).await.unwrap_err() {
            Error::NotFound {
                resource,
                identifier,
            } => {
                assert_eq!(resource, "Location");
                assert_eq!(identifier, "9");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
