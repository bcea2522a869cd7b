//! Entry point for the client (end-user) API.

use ptero_core::transport::ReqwestTransportBuilder;
use ptero_core::{
    ApiScope, ClientConfig, ErrorContext, HttpClient, HttpRequest, PanelClient, PanelConfig,
};
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

use crate::account::Account;
use crate::servers::ClientServers;
use crate::Result;

const USER_AGENT: &str = concat!("ptero-client/", env!("CARGO_PKG_VERSION"));

/// Builder for [`UserClient`].
pub struct UserClientBuilder {
    transport: ReqwestTransportBuilder,
    config: ClientConfig,
}

impl UserClientBuilder {
    /// Create a builder for the panel at `panel_url` using a client API key.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::ConfigError`] if the URL cannot be parsed.
    pub fn new(panel_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let transport = ReqwestTransportBuilder::new(panel_url, ApiScope::Client, api_key)?
            .with_user_agent(USER_AGENT);
        Ok(Self {
            transport,
            config: ClientConfig::new(),
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport = self.transport.with_user_agent(user_agent);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<UserClient> {
        let transport = self
            .transport
            .with_http_config(self.config.clone())
            .build()?;
        Ok(UserClient::from_transport(Arc::new(transport), self.config))
    }
}

/// Client API client, acting as the account that owns the key.
#[derive(Debug, Clone)]
pub struct UserClient {
    panel: PanelClient,
    account: Account,
    servers: ClientServers,
}

impl UserClient {
    /// Construct a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(panel_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        UserClientBuilder::new(panel_url, api_key)?.build()
    }

    /// Construct a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::ConfigError`] if the configuration is invalid.
    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        config.check()?;
        UserClientBuilder::new(&config.panel_url, config.api_key.clone())?
            .with_http_config(config.client_config())
            .build()
    }

    /// Construct a client over any transport.
    #[must_use]
    pub fn from_transport(transport: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        let panel = PanelClient::with_config(transport, config);
        Self {
            account: Account::new(panel.clone()),
            servers: ClientServers::new(panel.clone()),
            panel,
        }
    }

    /// Shared low-level client.
    #[must_use]
    pub fn panel(&self) -> &PanelClient {
        &self.panel
    }

    /// The account that owns the key.
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Servers visible to the account.
    #[must_use]
    pub fn servers(&self) -> &ClientServers {
        &self.servers
    }

    /// Verify that the panel is reachable and the key is accepted.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn health_check(&self) -> Result<()> {
        debug!("checking client API");
        let context = ErrorContext::new("Server").action("checking panel health");
        self.panel
            .send(HttpRequest::new(Method::GET, "/"), &context)
            .await
            .map(|_| ())
    }
}
