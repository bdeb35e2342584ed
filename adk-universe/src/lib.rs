//! # adk-universe
//!
//! Document store plugin that persists ingested files on a universe server,
//! a remote vector-indexing service that embeds and searches what it stores.
//!
//! The crate exposes one store, [`UniverseStore`], implementing the
//! [`RagPlugin`] contract an ingestion host drives:
//!
//! 1. [`required_credentials`](RagPlugin::required_credentials) names the
//!    bearer token the host must provide, derived from the server URL.
//! 2. [`init`](RagPlugin::init) validates configuration and takes the token.
//! 3. `add_file`, `update_file`, `delete_file` and `delete_all_files` each
//!    issue one REST call; `finalize` is a no-op.
//!
//! Requests that get no response at all are retried once after one second
//! (see [`RetryPolicy`]). Error statuses are returned as
//! [`UniverseError::ApiError`] without retrying.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use adk_universe::{RagPlugin, UniverseConfig, UniverseStore};
//!
//! let config = UniverseConfig::from_env()?;
//! let mut store = UniverseStore::new(config)?;
//!
//! let mut credentials = HashMap::new();
//! for name in store.required_credentials(None)?.into_keys() {
//!     credentials.insert(name, std::env::var("UNIVERSE_TOKEN")?);
//! }
//! store.init(&credentials, None).await?;
//!
//! store.add_file("doc1", "hello world").await?;
//! store.delete_file("doc1").await?;
//! store.finalize().await?;
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod document;
pub mod error;
pub mod plugin;
pub mod transport;

pub use client::{DEFAULT_RETRY_DELAY, RetryPolicy, UniverseStore};
pub use config::{UniverseConfig, UniverseConfigBuilder};
pub use credentials::{BearerToken, credential_name};
pub use document::Document;
pub use error::{Result, UniverseError};
pub use plugin::RagPlugin;
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
