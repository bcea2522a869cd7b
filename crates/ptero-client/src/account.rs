//! `/account`: profile, credentials, two-factor authentication and API keys.

use ptero_core::types::{Item, ListResponse};
use ptero_core::{ErrorContext, PanelClient, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::models::{
    AccountAttributes, ApiKeyAttributes, CreateApiKeyRequest, CreatedApiKey, RecoveryTokens,
    TwoFactorSetup,
};

const RESOURCE: &str = "Account";

#[derive(Deserialize)]
struct SetupEnvelope {
    data: TwoFactorSetup,
}

#[derive(Deserialize)]
struct SecretMeta {
    secret_token: String,
}

#[derive(Deserialize)]
struct CreatedKeyEnvelope {
    attributes: ApiKeyAttributes,
    meta: SecretMeta,
}

/// Operations on the account that owns the API key.
#[derive(Debug, Clone)]
pub struct Account {
    client: PanelClient,
}

impl Account {
    /// Bind to a panel client.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    fn context(action: &str) -> ErrorContext {
        ErrorContext::new(RESOURCE).action(action)
    }

    /// Profile of the account.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn details(&self) -> Result<AccountAttributes> {
        let item: Item<AccountAttributes> = self
            .client
            .get_json("/account", Vec::new(), &Self::context("loading account"))
            .await?;
        Ok(item.into_attributes())
    }

    /// Change the account email; requires the current password.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::Validation`] when the panel rejects the change.
    pub async fn update_email(&self, email: &str, password: &str) -> Result<()> {
        let body = json!({ "email": email, "password": password });
        self.client
            .send_empty(Method::PUT, "/account/email", Some(body), &Self::context("updating email"))
            .await
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::Validation`] when the panel rejects the change.
    pub async fn update_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let body = json!({
            "current_password": current_password,
            "password": new_password,
            "password_confirmation": new_password,
        });
        let context = Self::context("updating password");
        self.client
            .send_empty(Method::PUT, "/account/password", Some(body), &context)
            .await
    }

    /// Start two-factor setup and return the pairing data.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn two_factor_setup(&self) -> Result<TwoFactorSetup> {
        let context = Self::context("loading two-factor setup");
        let envelope: SetupEnvelope = self
            .client
            .get_json("/account/two-factor", Vec::new(), &context)
            .await?;
        Ok(envelope.data)
    }

    /// Confirm two-factor setup with a code from the authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::Validation`] for a wrong code.
    pub async fn enable_two_factor(&self, code: &str) -> Result<RecoveryTokens> {
        let body = json!({ "code": code });
        let context = Self::context("enabling two-factor");
        let item: Item<RecoveryTokens> = self
            .client
            .send_json(Method::POST, "/account/two-factor", Some(&body), &context)
            .await?;
        Ok(item.into_attributes())
    }

    /// Turn two-factor authentication off.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::Validation`] for a wrong password.
    pub async fn disable_two_factor(&self, password: &str) -> Result<()> {
        let body = json!({ "password": password });
        let context = Self::context("disabling two-factor");
        self.client
            .send_empty(Method::DELETE, "/account/two-factor", Some(body), &context)
            .await
    }

    /// API keys of the account.
    #[must_use]
    pub fn api_keys(&self) -> ApiKeys {
        ApiKeys {
            client: self.client.clone(),
        }
    }
}

/// `/account/api-keys`.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    client: PanelClient,
}

impl ApiKeys {
    /// List the account's API keys.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self) -> Result<Vec<ApiKeyAttributes>> {
        let context = ErrorContext::new("ApiKey").action("listing API keys");
        let page: ListResponse<ApiKeyAttributes> = self
            .client
            .get_json("/account/api-keys", Vec::new(), &context)
            .await?;
        Ok(page.into_attributes())
    }

    /// Create a key. The secret is only returned here.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::Validation`] when the panel rejects the request.
    pub async fn create(&self, description: &str, allowed_ips: &[String]) -> Result<CreatedApiKey> {
        debug!(description, "creating API key");
        let request = CreateApiKeyRequest {
            description: description.to_string(),
            allowed_ips: allowed_ips.to_vec(),
        };
        let context = ErrorContext::new("ApiKey").action("creating API key");
        let envelope: CreatedKeyEnvelope = self
            .client
            .send_json(Method::POST, "/account/api-keys", Some(&request), &context)
            .await?;
        Ok(CreatedApiKey {
            key: envelope.attributes,
            secret_token: envelope.meta.secret_token,
        })
    }

    /// Revoke a key by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown identifiers.
    pub async fn delete(&self, identifier: &str) -> Result<()> {
        let context = ErrorContext::new("ApiKey").identifier(identifier);
        self.client
            .send_empty(
                Method::DELETE,
                &format!("/account/api-keys/{identifier}"),
                None,
                &context,
            )
            .await
    }
}
