//! Application API data models for users, servers, nodes, nests, eggs and locations.

use chrono::{DateTime, Utc};
use ptero_core::types::ListResponse;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

// Some panel versions report booleans as 0/1.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Panel user as returned by `/users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAttributes {
    /// Panel user id.
    pub id: u64,
    /// External identifier, if linked to another system.
    #[serde(default)]
    pub external_id: Option<String>,
    /// User UUID.
    pub uuid: Uuid,
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
    /// Whether the user is a panel administrator.
    #[serde(default)]
    pub root_admin: bool,
    /// Whether two-factor authentication is enabled.
    #[serde(rename = "2fa", default)]
    pub two_factor: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request payload to create a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Email address.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Initial password; the panel emails a setup link when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Grant administrator rights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_admin: Option<bool>,
    /// Interface language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// External identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl CreateUserRequest {
    /// Minimal request with the required fields.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password: None,
            root_admin: None,
            language: None,
            external_id: None,
        }
    }
}

/// Partial update for a user. Unset fields are left untouched.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUserRequest {
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Administrator flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_admin: Option<bool>,
    /// Interface language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// External identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Servers
// ---------------------------------------------------------------------------

/// Resource limits of a server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerLimits {
    /// Memory in MiB (0 = unlimited).
    pub memory: u64,
    /// Swap in MiB (-1 = unlimited).
    pub swap: i64,
    /// Disk in MiB.
    pub disk: u64,
    /// Block IO weight.
    pub io: u32,
    /// CPU percentage.
    pub cpu: u32,
    /// Pinned CPU threads, e.g. "0-1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<String>,
    /// Whether the OOM killer is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oom_disabled: Option<bool>,
}

/// Feature limits of a server.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureLimits {
    /// Maximum databases.
    pub databases: u32,
    /// Maximum allocations.
    pub allocations: u32,
    /// Maximum backups.
    pub backups: u32,
}

/// Container settings of a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerContainer {
    /// Startup command.
    pub startup_command: String,
    /// Docker image.
    pub image: String,
    /// Whether installation finished.
    #[serde(default, deserialize_with = "bool_or_int")]
    pub installed: bool,
    /// Environment variables.
    #[serde(default)]
    pub environment: HashMap<String, Value>,
}

/// Server as returned by `/servers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerAttributes {
    /// Panel server id.
    pub id: u64,
    /// External identifier.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Server UUID.
    pub uuid: Uuid,
    /// Short identifier used by the client API.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Installation status, e.g. "installing".
    #[serde(default)]
    pub status: Option<String>,
    /// Whether the server is suspended.
    #[serde(default)]
    pub suspended: bool,
    /// Resource limits.
    pub limits: ServerLimits,
    /// Feature limits.
    pub feature_limits: FeatureLimits,
    /// Owner user id.
    pub user: u64,
    /// Node id.
    pub node: u64,
    /// Primary allocation id.
    pub allocation: u64,
    /// Nest id.
    pub nest: u64,
    /// Egg id.
    pub egg: u64,
    /// Container settings.
    pub container: ServerContainer,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Allocation selection for a new server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationSpec {
    /// Primary allocation id.
    pub default: u64,
    /// Additional allocation ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<u64>,
}

/// Automatic deployment settings for a new server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploySpec {
    /// Candidate location ids.
    pub locations: Vec<u64>,
    /// Require a dedicated IP.
    pub dedicated_ip: bool,
    /// Acceptable port ranges, e.g. "25565-25570".
    pub port_range: Vec<String>,
}

/// Request payload to create a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateServerRequest {
    /// Display name.
    pub name: String,
    /// Owner user id.
    pub user: u64,
    /// Egg id.
    pub egg: u64,
    /// Docker image.
    pub docker_image: String,
    /// Startup command.
    pub startup: String,
    /// Egg variables.
    #[serde(default)]
    pub environment: HashMap<String, Value>,
    /// Resource limits.
    pub limits: ServerLimits,
    /// Feature limits.
    pub feature_limits: FeatureLimits,
    /// Explicit allocation; mutually exclusive with `deploy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<AllocationSpec>,
    /// Automatic deployment; mutually exclusive with `allocation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeploySpec>,
    /// External identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start once installation completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_on_completion: Option<bool>,
    /// Skip the egg install script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_scripts: Option<bool>,
}

/// Partial update of `/servers/{id}/details`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateServerDetailsRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owner user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<u64>,
    /// External identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of `/servers/{id}/build`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateServerBuildRequest {
    /// Primary allocation id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<u64>,
    /// Allocation ids to add.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_allocations: Option<Vec<u64>>,
    /// Allocation ids to remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_allocations: Option<Vec<u64>>,
    /// Resource limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ServerLimits>,
    /// Feature limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_limits: Option<FeatureLimits>,
    /// Disable the OOM killer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oom_disabled: Option<bool>,
}

/// Partial update of `/servers/{id}/startup`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateServerStartupRequest {
    /// Startup command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<String>,
    /// Egg id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egg: Option<u64>,
    /// Docker image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Egg variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<HashMap<String, Value>>,
    /// Skip the egg install script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_scripts: Option<bool>,
}

/// Database attached to a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseAttributes {
    /// Database id.
    pub id: u64,
    /// Owning server id.
    pub server: u64,
    /// Database host id.
    pub host: u64,
    /// Database name.
    pub database: String,
    /// Database user.
    pub username: String,
    /// Allowed remote connection pattern.
    pub remote: String,
    /// Connection cap (0 = unlimited).
    #[serde(default)]
    pub max_connections: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request payload to create a server database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateDatabaseRequest {
    /// Database name.
    pub database: String,
    /// Allowed remote connection pattern, e.g. "%".
    pub remote: String,
    /// Database host id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<u64>,
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Memory and disk already assigned on a node.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocatedResources {
    /// Memory in MiB.
    pub memory: u64,
    /// Disk in MiB.
    pub disk: u64,
}

/// Node as returned by `/nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeAttributes {
    /// Panel node id.
    pub id: u64,
    /// Node UUID.
    pub uuid: Uuid,
    /// Whether the node is used for automatic deployment.
    #[serde(default)]
    pub public: bool,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Location id.
    pub location_id: u64,
    /// Daemon host name.
    pub fqdn: String,
    /// "http" or "https".
    #[serde(default)]
    pub scheme: String,
    /// Whether the daemon sits behind a proxy.
    #[serde(default)]
    pub behind_proxy: bool,
    /// Whether the node is in maintenance mode.
    #[serde(default)]
    pub maintenance_mode: bool,
    /// Memory in MiB.
    pub memory: u64,
    /// Memory overallocation percentage (-1 disables checks).
    #[serde(default)]
    pub memory_overallocate: i64,
    /// Disk in MiB.
    pub disk: u64,
    /// Disk overallocation percentage (-1 disables checks).
    #[serde(default)]
    pub disk_overallocate: i64,
    /// Maximum upload size in MiB.
    #[serde(default)]
    pub upload_size: u64,
    /// Daemon HTTP port.
    pub daemon_listen: u16,
    /// Daemon SFTP port.
    pub daemon_sftp: u16,
    /// Daemon data directory.
    #[serde(default)]
    pub daemon_base: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Resources already assigned to servers.
    #[serde(default)]
    pub allocated_resources: Option<AllocatedResources>,
}

/// Request payload to create a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateNodeRequest {
    /// Display name.
    pub name: String,
    /// Location id.
    pub location_id: u64,
    /// Daemon host name.
    pub fqdn: String,
    /// "http" or "https".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Whether the daemon sits behind a proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behind_proxy: Option<bool>,
    /// Memory in MiB.
    pub memory: u64,
    /// Memory overallocation percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_overallocate: Option<i64>,
    /// Disk in MiB.
    pub disk: u64,
    /// Disk overallocation percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_overallocate: Option<i64>,
    /// Maximum upload size in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_size: Option<u64>,
    /// Daemon SFTP port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_sftp: Option<u16>,
    /// Daemon HTTP port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_listen: Option<u16>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Daemon data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_base: Option<String>,
}

/// Partial update for a node.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateNodeRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Location id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
    /// Daemon host name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// "http" or "https".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Whether the daemon sits behind a proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behind_proxy: Option<bool>,
    /// Maintenance mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,
    /// Memory in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// Memory overallocation percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_overallocate: Option<i64>,
    /// Disk in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Disk overallocation percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_overallocate: Option<i64>,
    /// Maximum upload size in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_size: Option<u64>,
    /// Daemon SFTP port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_sftp: Option<u16>,
    /// Daemon HTTP port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_listen: Option<u16>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Daemon data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_base: Option<String>,
}

/// IP/port allocation on a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationAttributes {
    /// Allocation id.
    pub id: u64,
    /// Bound IP address.
    pub ip: String,
    /// Display alias for the IP.
    #[serde(default)]
    pub alias: Option<String>,
    /// Port.
    pub port: u16,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Whether a server uses the allocation.
    #[serde(default)]
    pub assigned: bool,
}

/// Request payload to create allocations on a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAllocationRequest {
    /// IP address or CIDR.
    pub ip: String,
    /// Ports or ranges, e.g. "25565" or "25565-25570".
    pub ports: Vec<String>,
    /// Display alias for the IP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

// ---------------------------------------------------------------------------
// Nests and eggs
// ---------------------------------------------------------------------------

/// Relationships that may be included on a nest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestRelationships {
    /// Eggs of the nest (`include=eggs`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eggs: Option<ListResponse<EggAttributes>>,
}

/// Nest as returned by `/nests`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NestAttributes {
    /// Nest id.
    pub id: u64,
    /// Nest UUID.
    pub uuid: Uuid,
    /// Author email.
    pub author: String,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Included relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<NestRelationships>,
}

/// Request payload to create a nest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateNestRequest {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update for a nest.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateNestRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Daemon configuration of an egg.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EggConfig {
    /// Config file parsers.
    #[serde(default)]
    pub files: Value,
    /// Startup detection.
    #[serde(default)]
    pub startup: Value,
    /// Stop command.
    #[serde(default)]
    pub stop: String,
    /// Log settings.
    #[serde(default)]
    pub logs: Value,
    /// Egg id this configuration is inherited from.
    #[serde(default)]
    pub extends: Option<Value>,
}

/// Install script of an egg.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EggScript {
    /// Run the script privileged.
    #[serde(default)]
    pub privileged: bool,
    /// Script body.
    #[serde(default)]
    pub install: Option<String>,
    /// Entrypoint.
    #[serde(default)]
    pub entry: String,
    /// Install container image.
    #[serde(default)]
    pub container: String,
    /// Egg id the script is inherited from.
    #[serde(default)]
    pub extends: Option<String>,
}

/// Egg variable definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EggVariableAttributes {
    /// Variable id.
    pub id: u64,
    /// Owning egg id.
    pub egg_id: u64,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Environment variable name.
    pub env_variable: String,
    /// Default value.
    #[serde(default)]
    pub default_value: String,
    /// Visible to server owners.
    #[serde(default)]
    pub user_viewable: bool,
    /// Editable by server owners.
    #[serde(default)]
    pub user_editable: bool,
    /// Laravel validation rules.
    #[serde(default)]
    pub rules: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Relationships that may be included on an egg.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EggRelationships {
    /// Variables of the egg (`include=variables`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<ListResponse<EggVariableAttributes>>,
}

/// Egg as returned by `/nests/{nest}/eggs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EggAttributes {
    /// Egg id.
    pub id: u64,
    /// Egg UUID.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// Owning nest id.
    pub nest: u64,
    /// Author email.
    pub author: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Default docker image.
    pub docker_image: String,
    /// Selectable docker images keyed by label.
    #[serde(default)]
    pub docker_images: HashMap<String, String>,
    /// Daemon configuration.
    #[serde(default)]
    pub config: EggConfig,
    /// Startup command template.
    pub startup: String,
    /// Install script.
    #[serde(default)]
    pub script: EggScript,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Included relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<EggRelationships>,
}

/// Request payload to create an egg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateEggRequest {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default docker image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    /// Selectable docker images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_images: Option<HashMap<String, String>>,
    /// Daemon configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Startup command template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<String>,
    /// Install script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
}

/// Partial update for an egg.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateEggRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default docker image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    /// Selectable docker images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_images: Option<HashMap<String, String>>,
    /// Daemon configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Startup command template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<String>,
    /// Install script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// Location as returned by `/locations`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationAttributes {
    /// Location id.
    pub id: u64,
    /// Short code, e.g. "nyc".
    pub short: String,
    /// Long description.
    #[serde(default)]
    pub long: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Request payload to create a location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateLocationRequest {
    /// Short code.
    pub short: String,
    /// Long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
}

/// Partial update for a location.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateLocationRequest {
    /// Short code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_two_factor_field_is_renamed() {
        let user: UserAttributes = serde_json::from_value(json!({
            "id": 1,
            "external_id": null,
            "uuid": "c4022c6c-9bf1-4a23-bff9-519cceb38335",
            "username": "codeco",
            "email": "codeco@file.properties",
            "first_name": "Rihan",
            "last_name": "Arfan",
            "language": "en",
            "root_admin": true,
            "2fa": false,
            "created_at": "2020-06-12T20:18:43+00:00",
            "updated_at": "2020-06-12T20:18:43+00:00"
        }))
        .unwrap();
        assert!(!user.two_factor);
        assert!(user.root_admin);

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["2fa"], json!(false));
    }

    #[test]
    fn container_installed_accepts_integers() {
        let container: ServerContainer = serde_json::from_value(json!({
            "startup_command": "java -jar server.jar",
            "image": "quay.io/pterodactyl/core:java",
            "installed": 1,
            "environment": { "SERVER_JARFILE": "server.jar", "VANILLA_VERSION": "latest" }
        }))
        .unwrap();
        assert!(container.installed);
    }

    #[test]
    fn update_requests_skip_unset_fields() {
        let update = UpdateNodeRequest {
            maintenance_mode: Some(true),
            ..UpdateNodeRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "maintenance_mode": true })
        );
        assert_eq!(
            serde_json::to_value(UpdateUserRequest::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn create_user_request_minimal_body() {
        let request = CreateUserRequest::new("a@example.com", "alice", "Alice", "Liddell");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "email": "a@example.com",
                "username": "alice",
                "first_name": "Alice",
                "last_name": "Liddell"
            })
        );
    }
}
