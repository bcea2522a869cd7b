//! # ptero-core
//!
//! Core types and utilities for working with a Pterodactyl panel.
//!
//! This crate provides the error taxonomy, configuration, HTTP transport and the
//! rate-limited request queue shared by the application- and client-scope crates.
//!
//! ## Modules
//!
//! - [`error`] - Error kinds and translation of HTTP failures
//! - [`config`] - Validated panel connection settings
//! - [`client`] - HTTP client configuration and the shared [`PanelClient`]
//! - [`transport`] - The [`HttpClient`] capability and its reqwest implementation
//! - [`queue`] - Per-manager FIFO queue with a fixed dispatch rate
//! - [`entity`] - Loaded/unloaded state held by entity wrappers
//! - [`types`] - Response envelopes, pagination and list parameters
//! - [`query`] - Query parameter builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod queue;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use client::{ClientConfig, PanelClient};
pub use config::PanelConfig;
pub use entity::{EntityCell, EntityState, Identified};
pub use error::{Error, ErrorContext, FieldError, Result};
pub use queue::{Queued, RateLimitedQueue};
pub use transport::{ApiScope, HttpClient, HttpFailure, HttpRequest, HttpResponse, ReqwestTransport};
pub use types::{Item, ListParams, ListResponse, Pagination, SortOrder};
