//! Client API data models: the account, its API keys and the servers it can see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The account that owns the API key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountAttributes {
    /// Panel user id.
    pub id: u64,
    /// Whether the account is a panel administrator.
    #[serde(default)]
    pub admin: bool,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Interface language code.
    #[serde(default)]
    pub language: String,
}

/// Data needed to pair an authenticator app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwoFactorSetup {
    /// `otpauth://` URL to render as a QR code.
    pub image_url_data: String,
    /// Shared secret for manual entry.
    #[serde(default)]
    pub secret: Option<String>,
}

/// Recovery tokens returned when two-factor authentication is enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoveryTokens {
    /// Single-use recovery codes.
    #[serde(default)]
    pub tokens: Vec<String>,
}

/// An account API key. The secret is only returned once, on creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeyAttributes {
    /// Public key identifier.
    pub identifier: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// IPs allowed to use the key; empty means any.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    /// Last use.
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A freshly created API key together with its secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CreatedApiKey {
    /// The key's public attributes.
    pub key: ApiKeyAttributes,
    /// Full token to send as the bearer credential.
    pub secret_token: String,
}

impl fmt::Debug for CreatedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedApiKey")
            .field("key", &self.key)
            .field("secret_token", &"[REDACTED]")
            .finish()
    }
}

/// Request payload to create an API key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateApiKeyRequest {
    /// Free-form description.
    pub description: String,
    /// IPs allowed to use the key.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

/// SFTP connection details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SftpDetails {
    /// Host or IP.
    pub ip: String,
    /// Port.
    pub port: u16,
}

/// Limits as shown to the server owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientServerLimits {
    /// Memory in MiB.
    pub memory: u64,
    /// Swap in MiB.
    pub swap: i64,
    /// Disk in MiB.
    pub disk: u64,
    /// Block IO weight.
    pub io: u32,
    /// CPU percentage.
    pub cpu: u32,
    /// Pinned CPU threads.
    #[serde(default)]
    pub threads: Option<String>,
}

/// A server visible to the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientServerAttributes {
    /// Whether the account owns the server (rather than being a subuser).
    #[serde(default)]
    pub server_owner: bool,
    /// Short identifier used in client API paths.
    pub identifier: String,
    /// Server UUID.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// Node display name.
    #[serde(default)]
    pub node: String,
    /// SFTP connection details.
    pub sftp_details: SftpDetails,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Resource limits.
    pub limits: ClientServerLimits,
    /// Whether the server is suspended.
    #[serde(default)]
    pub is_suspended: bool,
    /// Whether installation is still running.
    #[serde(default)]
    pub is_installing: bool,
    /// Whether the server is being moved between nodes.
    #[serde(default)]
    pub is_transferring: bool,
}

/// Live usage counters reported by the daemon.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceCounters {
    /// Memory in bytes.
    pub memory_bytes: u64,
    /// CPU usage in percent of one core.
    pub cpu_absolute: f64,
    /// Disk in bytes.
    pub disk_bytes: u64,
    /// Bytes received.
    pub network_rx_bytes: u64,
    /// Bytes sent.
    pub network_tx_bytes: u64,
    /// Uptime in milliseconds.
    #[serde(default)]
    pub uptime: u64,
}

/// Current state and usage of a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceUsage {
    /// "running", "starting", "stopping" or "offline".
    pub current_state: String,
    /// Whether the server is suspended.
    #[serde(default)]
    pub is_suspended: bool,
    /// Usage counters.
    pub resources: ResourceCounters,
}

/// Power action sent to `/servers/{id}/power`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSignal {
    /// Start the server.
    Start,
    /// Stop gracefully.
    Stop,
    /// Stop then start.
    Restart,
    /// Terminate immediately.
    Kill,
}

impl PowerSignal {
    /// Wire name of the signal.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Kill => "kill",
        }
    }
}

impl fmt::Display for PowerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
