//! HTTP transport capability.
//!
//! Everything above this module talks to the panel through [`HttpClient`], which
//! executes exactly one request and reports either a response or a raw failure.
//! [`ReqwestTransport`] is the production implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::client::ClientConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("ptero-core/", env!("CARGO_PKG_VERSION"));

/// Which half of the panel API a transport is rooted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiScope {
    /// Administrative API (`/api/application`)
    Application,
    /// Per-user API (`/api/client`)
    Client,
}

impl ApiScope {
    /// Path prefix for the scope.
    #[must_use]
    pub const fn base_path(&self) -> &'static str {
        match self {
            Self::Application => "api/application/",
            Self::Client => "api/client/",
        }
    }
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the scope root, e.g. `/users/1`
    pub path: String,
    /// Optional JSON body
    pub body: Option<Value>,
    /// Query string pairs
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request without body or query.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach query pairs.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body (`Null` when empty)
    pub data: Value,
}

/// Why a request did not produce a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpFailure {
    /// No response at all (connect, DNS, TLS, timeout)
    Transport {
        /// Underlying error text
        message: String,
    },
    /// The panel answered with a non-2xx status
    Status {
        /// HTTP status code
        status: u16,
        /// Parsed error body
        body: Value,
        /// `Retry-After` header in seconds, if present
        retry_after: Option<u64>,
    },
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "transport failure: {message}"),
            Self::Status { status, .. } => write!(f, "panel responded with {status}"),
        }
    }
}

impl From<reqwest::Error> for HttpFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Capability to execute a single panel request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute `request` and return the response or a raw failure.
    async fn request(&self, request: HttpRequest) -> std::result::Result<HttpResponse, HttpFailure>;
}

/// Builder for [`ReqwestTransport`].
pub struct ReqwestTransportBuilder {
    base_url: Url,
    config: ClientConfig,
    token: SecretString,
    user_agent: String,
}

impl ReqwestTransportBuilder {
    /// Create a builder for the given panel URL, scope and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel URL cannot be parsed.
    pub fn new(
        panel_url: impl AsRef<str>,
        scope: ApiScope,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let raw = panel_url.as_ref();
        let mut url = Url::parse(raw)
            .map_err(|err| Error::ConfigError(format!("Invalid panel URL `{raw}`: {err}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let base_url = url.join(scope.base_path())?;

        Ok(Self {
            base_url,
            config: ClientConfig::new(),
            token: SecretString::from(api_key.into()),
            user_agent: USER_AGENT.to_string(),
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
        self.user_agent = user_agent.into();
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ClientBuilder::new()
            .timeout(self.config.timeout)
            .user_agent(self.user_agent)
            .pool_idle_timeout(self.config.pool_idle_timeout)
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_secs(10));

        if !self.config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(ReqwestTransport {
            http,
            base_url: self.base_url,
            token: self.token,
            log_requests: self.config.enable_logging,
        })
    }
}

/// [`HttpClient`] backed by `reqwest`.
pub struct ReqwestTransport {
    http: Client,
    base_url: Url,
    token: SecretString,
    log_requests: bool,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"***************")
            .finish()
    }
}

impl ReqwestTransport {
    /// Construct directly from a panel URL, scope and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(
        panel_url: impl AsRef<str>,
        scope: ApiScope,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        ReqwestTransportBuilder::new(panel_url, scope, api_key)?.build()
    }

    /// Access the scope root URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> std::result::Result<Url, HttpFailure> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| HttpFailure::Transport {
                message: format!("Invalid panel path `{path}`: {err}"),
            })
    }
}

#[async_trait]
impl HttpClient for ReqwestTransport {
    async fn request(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, HttpFailure> {
        let url = self.build_url(&request.path)?;
        if self.log_requests {
            info!(method = %request.method, path = %request.path, "panel request");
        }

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .query(&request.query)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let retry_after = retry_after_secs(response.headers());
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(HttpResponse {
                status: status.as_u16(),
                data: parse_body(status, &bytes),
            });
        }

        debug!(%status, path = %request.path, "panel returned an error status");
        Err(HttpFailure::Status {
            status: status.as_u16(),
            body: parse_body(status, &bytes),
            retry_after,
        })
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn parse_body(status: StatusCode, bytes: &[u8]) -> Value {
    if status == StatusCode::NO_CONTENT || bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|_| {
        serde_json::json!({ "message": String::from_utf8_lossy(bytes).into_owned() })
    })
}
