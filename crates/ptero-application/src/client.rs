//! Entry point for the application (administrative) API.

use ptero_core::transport::ReqwestTransportBuilder;
use ptero_core::{
    ApiScope, ClientConfig, ErrorContext, HttpClient, HttpRequest, PanelClient, PanelConfig,
};
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

use crate::eggs::Eggs;
use crate::locations::Locations;
use crate::nests::Nests;
use crate::nodes::Nodes;
use crate::servers::Servers;
use crate::users::Users;
use crate::Result;

const USER_AGENT: &str = concat!("ptero-application/", env!("CARGO_PKG_VERSION"));

/// Builder for [`ApplicationClient`].
pub struct ApplicationClientBuilder {
    transport: ReqwestTransportBuilder,
    config: ClientConfig,
}

impl ApplicationClientBuilder {
    /// Create a builder for the panel at `panel_url` using an application API key.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::ConfigError`] if the URL cannot be parsed.
    pub fn new(panel_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let transport = ReqwestTransportBuilder::new(panel_url, ApiScope::Application, api_key)?
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

    /// Override how many queued operations each manager dispatches per second.
    #[must_use]
    pub fn with_rate_per_second(mut self, rate: u32) -> Self {
        self.config = self.config.with_rate_per_second(rate);
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
    pub fn build(self) -> Result<ApplicationClient> {
        let transport = self
            .transport
            .with_http_config(self.config.clone())
            .build()?;
        Ok(ApplicationClient::from_transport(
            Arc::new(transport),
            self.config,
        ))
    }
}

/// Application API client.
///
/// Each manager owns its own request queue, so creates and deletes on users
/// never wait behind those on servers. Clones share the managers and queues.
#[derive(Debug, Clone)]
pub struct ApplicationClient {
    panel: PanelClient,
    users: Users,
    servers: Servers,
    nodes: Nodes,
    nests: Nests,
    locations: Locations,
}

impl ApplicationClient {
    /// Construct a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(panel_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        ApplicationClientBuilder::new(panel_url, api_key)?.build()
    }

    /// Construct a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::ConfigError`] if the configuration is invalid.
    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        config.check()?;
        ApplicationClientBuilder::new(&config.panel_url, config.api_key.clone())?
            .with_http_config(config.client_config())
            .build()
    }

    /// Construct a client over any transport.
    #[must_use]
    pub fn from_transport(transport: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        let panel = PanelClient::with_config(transport, config);
        Self {
            users: Users::new(panel.clone()),
            servers: Servers::new(panel.clone()),
            nodes: Nodes::new(panel.clone()),
            nests: Nests::new(panel.clone()),
            locations: Locations::new(panel.clone()),
            panel,
        }
    }

    /// Shared low-level client.
    #[must_use]
    pub fn panel(&self) -> &PanelClient {
        &self.panel
    }

    /// Users manager.
    #[must_use]
    pub fn users(&self) -> &Users {
        &self.users
    }

    /// Servers manager.
    #[must_use]
    pub fn servers(&self) -> &Servers {
        &self.servers
    }

    /// Nodes manager.
    #[must_use]
    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    /// Nests manager.
    #[must_use]
    pub fn nests(&self) -> &Nests {
        &self.nests
    }

    /// Locations access.
    #[must_use]
    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    /// Eggs manager for `nest_id`; repeated calls share one queue.
    #[must_use]
    pub fn eggs(&self, nest_id: u64) -> Eggs {
        self.nests.eggs(nest_id)
    }

    /// Verify that the panel is reachable and the key is accepted.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn health_check(&self) -> Result<()> {
        debug!("checking application API");
        let request = HttpRequest::new(Method::GET, "/servers")
            .with_query(vec![("per_page".to_string(), "1".to_string())]);
        let context = ErrorContext::new("Server").action("checking panel health");
        self.panel.send(request, &context).await.map(|_| ())
    }
}
