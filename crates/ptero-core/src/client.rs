//! Shared panel client and HTTP client configuration.
//!
//! [`PanelClient`] is the single handle every collection manager receives. It owns
//! the transport, translates failures into [`Error`] kinds exactly once, and builds
//! the per-manager request queues at the configured rate.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;

use crate::error::{translate_failure, Error, ErrorContext, Result};
use crate::queue::RateLimitedQueue;
use crate::transport::{HttpClient, HttpRequest};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default queue dispatch rate (operations per second)
pub const DEFAULT_RATE_PER_SECOND: u32 = 5;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
///
/// Configures transport behavior (timeouts, connection pooling) and the dispatch
/// rate of the request queues owned by collection managers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable request logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,

    /// Queued operations dispatched per second, per manager
    pub rate_per_second: u32,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
            rate_per_second: DEFAULT_RATE_PER_SECOND,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }

    /// Set the queue dispatch rate. Zero is treated as one per second.
    #[must_use]
    pub const fn with_rate_per_second(mut self, rate: u32) -> Self {
        self.rate_per_second = rate;
        self
    }

    /// Minimum spacing between two queued dispatches (`1000 / rate` ms).
    #[must_use]
    pub const fn dispatch_interval(&self) -> Duration {
        let rate = if self.rate_per_second == 0 {
            1
        } else {
            self.rate_per_second
        };
        Duration::from_millis(1000 / rate as u64)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the panel, passed to every collection manager.
#[derive(Clone)]
pub struct PanelClient {
    transport: Arc<dyn HttpClient>,
    config: ClientConfig,
    lanes: Arc<Mutex<HashMap<(&'static str, u64), RateLimitedQueue>>>,
}

impl fmt::Debug for PanelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PanelClient {
    /// Wrap a transport with default configuration.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpClient>) -> Self {
        Self::with_config(transport, ClientConfig::new())
    }

    /// Wrap a transport with explicit configuration.
    #[must_use]
    pub fn with_config(transport: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            lanes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a fresh request queue at the configured rate.
    #[must_use]
    pub fn queue(&self, name: &'static str) -> RateLimitedQueue {
        RateLimitedQueue::new(name, self.config.dispatch_interval())
    }

    /// Request queue for `name` scoped to a parent resource, created on first use.
    ///
    /// Every clone of this client returns the same lane for the same `(name, key)`
    /// until [`PanelClient::release_queue`] drops it.
    #[must_use]
    pub fn keyed_queue(&self, name: &'static str, key: u64) -> RateLimitedQueue {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((name, key))
            .or_insert_with(|| self.queue(name))
            .clone()
    }

    /// Forget the keyed lane for `(name, key)`. Managers already holding it keep
    /// working; the next [`PanelClient::keyed_queue`] call starts a new lane.
    pub fn release_queue(&self, name: &'static str, key: u64) {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(name, key));
    }

    /// Number of keyed lanes currently registered.
    #[must_use]
    pub fn keyed_queue_count(&self) -> usize {
        self.lanes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Execute a request and return the raw JSON body.
    ///
    /// # Errors
    ///
    /// Returns the translated error kind for any failure.
    pub async fn send(&self, request: HttpRequest, context: &ErrorContext) -> Result<Value> {
        match self.transport.request(request).await {
            Ok(response) => Ok(response.data),
            Err(failure) => {
                let err = translate_failure(failure, context);
                if err.should_log() {
                    warn!(code = err.error_code(), error = %err, "panel request failed");
                }
                Err(err)
            }
        }
    }

    /// GET `path` and deserialize the body.
    ///
    /// # Errors
    ///
    /// Returns the translated error kind, or [`Error::ParseError`] for unexpected bodies.
    pub async fn get_json<T>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
        context: &ErrorContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = HttpRequest::new(Method::GET, path).with_query(query);
        let data = self.send(request, context).await?;
        decode(path, data)
    }

    /// Send an optional JSON body and deserialize the response.
    ///
    /// # Errors
    ///
    /// Returns the translated error kind, or [`Error::ParseError`] for unexpected bodies.
    pub async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: &ErrorContext,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = HttpRequest::new(method, path);
        if let Some(payload) = body {
            request = request.with_body(serde_json::to_value(payload)?);
        }
        let data = self.send(request, context).await?;
        decode(path, data)
    }

    /// Send a request whose response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns the translated error kind.
    pub async fn send_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        context: &ErrorContext,
    ) -> Result<()> {
        let mut request = HttpRequest::new(method, path);
        if let Some(payload) = body {
            request = request.with_body(payload);
        }
        self.send(request, context).await.map(|_| ())
    }
}

fn decode<T>(path: &str, data: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(data)
        .map_err(|err| Error::ParseError(format!("Unexpected response for `{path}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpFailure, HttpResponse, MockHttpClient};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn client_with(mock: MockHttpClient) -> PanelClient {
        PanelClient::new(Arc::new(mock))
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.rate_per_second, DEFAULT_RATE_PER_SECOND);
        assert!(config.enable_logging);
        assert!(config.enable_compression);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_pool_idle_timeout(Duration::from_secs(120))
            .with_pool_max_idle(20)
            .with_logging(false)
            .with_compression(false)
            .with_rate_per_second(10);

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert!(!config.enable_logging);
        assert!(!config.enable_compression);
        assert_eq!(config.rate_per_second, 10);
    }

    #[test]
    fn test_dispatch_interval() {
        assert_eq!(
            ClientConfig::new().dispatch_interval(),
            Duration::from_millis(200)
        );
        assert_eq!(
            ClientConfig::new()
                .with_rate_per_second(3)
                .dispatch_interval(),
            Duration::from_millis(333)
        );
        assert_eq!(
            ClientConfig::new()
                .with_rate_per_second(0)
                .dispatch_interval(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn queue_uses_configured_rate() {
        let client = PanelClient::with_config(
            Arc::new(MockHttpClient::new()),
            ClientConfig::new().with_rate_per_second(4),
        );
        let queue = client.queue("users");
        assert_eq!(queue.name(), "users");
        assert_eq!(queue.interval(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn keyed_queue_is_shared_across_clones_until_released() {
        let client = PanelClient::new(Arc::new(MockHttpClient::new()));
        let clone = client.clone();

        let ticket = client.keyed_queue("eggs", 1).enqueue(|| async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        });
        assert!(clone.keyed_queue("eggs", 1).is_draining());
        assert!(!clone.keyed_queue("eggs", 2).is_draining());
        assert_eq!(client.keyed_queue_count(), 2);

        client.release_queue("eggs", 1);
        assert_eq!(client.keyed_queue_count(), 1);
        assert!(!clone.keyed_queue("eggs", 1).is_draining());
        ticket.await.unwrap();
    }

    #[tokio::test]
    async fn get_json_decodes_body() {
        let mut mock = MockHttpClient::new();
        mock.expect_request()
            .withf(|request| request.method == Method::GET && request.path == "/users/1")
            .times(1)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 200,
                    data: json!({ "name": "alice" }),
                })
            });

        let named: Named = client_with(mock)
            .get_json("/users/1", Vec::new(), &ErrorContext::new("User"))
            .await
            .unwrap();
        assert_eq!(named.name, "alice");
    }

    #[tokio::test]
    async fn failures_are_translated_once() {
        let mut mock = MockHttpClient::new();
        mock.expect_request().times(1).returning(|_| {
            Err(HttpFailure::Status {
                status: 404,
                body: json!({}),
                retry_after: None,
            })
        });

        let err = client_with(mock)
            .send_empty(
                Method::DELETE,
                "/servers/9",
                None,
                &ErrorContext::new("Server").identifier(9),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::NotFound {
                resource: "Server".to_string(),
                identifier: "9".to_string()
            }
        );
    }

    #[tokio::test]
    async fn send_json_serializes_body() {
        let mut mock = MockHttpClient::new();
        mock.expect_request()
            .withf(|request| request.body == Some(json!({ "short": "nyc" })))
            .times(1)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 201,
                    data: json!({ "name": "nyc" }),
                })
            });

        let named: Named = client_with(mock)
            .send_json(
                Method::POST,
                "/locations",
                Some(&json!({ "short": "nyc" })),
                &ErrorContext::new("Location"),
            )
            .await
            .unwrap();
        assert_eq!(named.name, "nyc");
    }

    #[tokio::test]
    async fn unexpected_body_is_parse_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_request().returning(|_| {
            Ok(HttpResponse {
                status: 200,
                data: json!([1, 2, 3]),
            })
        });

        let err = client_with(mock)
            .get_json::<Named>("/users/1", Vec::new(), &ErrorContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
