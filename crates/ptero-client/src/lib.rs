//! Client (end-user) API for a Pterodactyl panel.
//!
//! [`UserClient`] acts as the account that owns the API key. It exposes the
//! account profile, two-factor setup and API keys through [`Account`], and the
//! servers the account can reach through [`ClientServers`]. Every call goes
//! straight to the panel; nothing here is queued.

#![deny(missing_docs)]

pub mod account;
pub mod client;
pub mod models;
pub mod servers;

pub use account::{Account, ApiKeys};
pub use client::{UserClient, UserClientBuilder};
pub use models::{
    AccountAttributes, ApiKeyAttributes, ClientServerAttributes, ClientServerLimits,
    CreateApiKeyRequest, CreatedApiKey, PowerSignal, RecoveryTokens, ResourceCounters,
    ResourceUsage, SftpDetails, TwoFactorSetup,
};
pub use servers::ClientServers;

/// Convenient result alias that reuses the shared panel error type.
pub type Result<T> = ptero_core::Result<T>;
