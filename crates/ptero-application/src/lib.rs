//! Application (administrative) API client for a Pterodactyl panel.
//!
//! [`ApplicationClient`] hands out one manager per resource collection. Reads
//! go straight to the panel. Creates and deletes issued through a manager are
//! pushed onto that manager's rate-limited queue and resolve through a
//! [`ptero_core::Queued`] ticket. Entity wrappers ([`User`], [`Server`],
//! [`Node`], [`Nest`], [`Egg`]) hold their last known attributes and expose
//! direct `refresh`, `update` and `delete` calls.

#![deny(missing_docs)]

pub mod client;
mod collection;
pub mod eggs;
pub mod filter;
pub mod locations;
pub mod models;
pub mod nests;
pub mod nodes;
pub mod servers;
pub mod users;

pub use client::{ApplicationClient, ApplicationClientBuilder};
pub use collection::{BulkResult, BulkSettled};
pub use eggs::{Egg, Eggs};
pub use filter::{FieldValue, Filter, Filterable};
pub use locations::Locations;
pub use models::{
    AllocatedResources, AllocationAttributes, AllocationSpec, CreateAllocationRequest,
    CreateDatabaseRequest, CreateEggRequest, CreateLocationRequest, CreateNestRequest,
    CreateNodeRequest, CreateServerRequest, CreateUserRequest, DatabaseAttributes, DeploySpec,
    EggAttributes, EggVariableAttributes, FeatureLimits, LocationAttributes, NestAttributes,
    NodeAttributes, ServerAttributes, ServerContainer, ServerLimits, UpdateEggRequest,
    UpdateLocationRequest, UpdateNestRequest, UpdateNodeRequest, UpdateServerBuildRequest,
    UpdateServerDetailsRequest, UpdateServerStartupRequest, UpdateUserRequest, UserAttributes,
};
pub use nests::{Nest, Nests};
pub use nodes::{Node, NodeAllocations, Nodes};
pub use servers::{Server, ServerDatabases, ServerField, Servers};
pub use users::{User, UserField, Users};

/// Convenient result alias that reuses the shared panel error type.
pub type Result<T> = ptero_core::Result<T>;
