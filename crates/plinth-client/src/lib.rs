//! Plinth client core — the authenticated request pipeline for the Plinth
//! backend platform.
//!
//! Turns a logical `(method, path, data, options)` call into a signed,
//! retried, normalized exchange with the platform REST API.
//!
//! # Main Components
//!
//! - **Request Orchestrator** (`Client::request`): payload assembly,
//!   credential tiering, concurrent identity resolution
//! - **Transport Dispatcher**: one transport call per attempt, with
//!   randomized exponential backoff on transient failures
//! - **Error Normalizer**: every failure surfaces as an `ApiError` carrying
//!   the platform's numeric code
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use plinth_client::{Client, ClientConfig, FixedInstallationId, RequestOptions};
//! use serde_json::json;
//!
//! # async fn example() -> plinth_client::Result<()> {
//! let config = ClientConfig::new("https://api.example.com/1", "my-app-id")
//!     .with_javascript_key("my-js-key");
//! let client = Client::over_http(config, Arc::new(FixedInstallationId::new("iid")))?;
//!
//! let created = client
//!     .request("POST", "classes/Foo", json!({"bar": 1}), &RequestOptions::default())
//!     .await?;
//! println!("objectId: {}", created["objectId"]);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod transport;

pub use client::{Client, RequestOptions};
pub use config::{ClientConfig, ServerAuth};
pub use dispatch::{DispatchError, DispatchSuccess, Dispatcher};
pub use error::{codes, ApiError, Error, Result};
pub use identity::{
    CurrentUserProvider, FixedInstallationId, InstallationIdProvider, SessionUser,
};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
