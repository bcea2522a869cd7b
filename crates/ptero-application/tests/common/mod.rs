//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ptero_application::ApplicationClient;
use ptero_core::{ClientConfig, HttpClient, HttpFailure, HttpRequest, HttpResponse};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub at: Instant,
}

struct Reply {
    delay: Duration,
    outcome: Result<Value, HttpFailure>,
}

#[derive(Default)]
struct Script {
    replies: HashMap<(Method, String), VecDeque<Reply>>,
    calls: Vec<Call>,
}

/// Answers requests from per-(method, path) reply queues and records every call.
///
/// Unscripted requests fail with a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful reply.
    pub fn reply(&self, method: Method, path: &str, data: Value) {
        self.reply_after(method, path, Duration::ZERO, data);
    }

    /// Queue a successful reply that arrives after `delay`.
    pub fn reply_after(&self, method: Method, path: &str, delay: Duration, data: Value) {
        self.push(
            method,
            path,
            Reply {
                delay,
                outcome: Ok(data),
            },
        );
    }

    /// Queue a failing reply.
    pub fn fail(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(
            method,
            path,
            Reply {
                delay: Duration::ZERO,
                outcome: Err(HttpFailure::Status {
                    status,
                    body,
                    retry_after: None,
                }),
            },
        );
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Highest number of requests that were in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for ScriptedTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpFailure> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call {
                method: request.method.clone(),
                path: request.path.clone(),
                body: request.body.clone(),
                at: Instant::now(),
            });
            script
                .replies
                .get_mut(&(request.method.clone(), request.path.clone()))
                .and_then(VecDeque::pop_front)
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let reply = reply.unwrap_or(Reply {
            delay: Duration::ZERO,
            outcome: Err(HttpFailure::Status {
                status: 404,
                body: json!({}),
                retry_after: None,
            }),
        });
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply.outcome.map(|data| HttpResponse { status: 200, data })
    }
}

/// Application client over `transport` dispatching `rate` queued operations per second.
pub fn client_over(transport: &Arc<ScriptedTransport>, rate: u32) -> ApplicationClient {
    let config = ClientConfig::new().with_rate_per_second(rate);
    ApplicationClient::from_transport(transport.clone(), config)
}

pub fn user_item(id: u64, username: &str) -> Value {
    json!({
        "object": "user",
        "attributes": {
            "id": id,
            "external_id": null,
            "uuid": format!("00000000-0000-4000-8000-{id:012}"),
            "username": username,
            "email": format!("{username}@example.com"),
            "first_name": username,
            "last_name": "Test",
            "language": "en",
            "root_admin": false,
            "2fa": false,
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": null
        }
    })
}

pub fn server_item(id: u64, suspended: bool) -> Value {
    json!({
        "object": "server",
        "attributes": {
            "id": id,
            "external_id": null,
            "uuid": format!("00000000-0000-4000-8000-{id:012}"),
            "identifier": format!("{id:08x}"),
            "name": format!("server-{id}"),
            "description": null,
            "suspended": suspended,
            "limits": { "memory": 1024, "swap": 0, "disk": 5120, "io": 500, "cpu": 100 },
            "feature_limits": { "databases": 0, "allocations": 1, "backups": 0 },
            "user": 1,
            "node": 1,
            "allocation": id,
            "nest": 1,
            "egg": 1,
            "container": {
                "startup_command": "./start.sh",
                "image": "ghcr.io/pterodactyl/yolks:debian",
                "installed": true,
                "environment": {}
            },
            "created_at": "2024-01-01T00:00:00+00:00"
        }
    })
}

pub fn nest_item(id: u64) -> Value {
    json!({
        "object": "nest",
        "attributes": {
            "id": id,
            "uuid": format!("00000000-0000-4000-8000-{id:012}"),
            "author": "support@pterodactyl.io",
            "name": format!("nest-{id}"),
            "description": null,
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": null
        }
    })
}

pub fn validation_failure(field: &str) -> Value {
    json!({
        "errors": [{
            "code": "ValidationException",
            "status": "422",
            "detail": format!("The {field} field is required."),
            "meta": { "source_field": field, "rule": "required" }
        }]
    })
}
