//! # phishnet-core
//!
//! Async client for the phish.net v3 REST API.
//!
//! ## Overview
//!
//! - **Validation** of dates, years, months and id lists before anything is sent
//! - **Per-user authorization** negotiated with the application's private salt
//!   and cached for the session
//! - **Bounded retry** of transport failures; API errors are returned at once
//! - **Pluggable transport** behind the [`HttpClient`] trait
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`auth`] | Auth key negotiation and the session credential cache |
//! | [`catalog`] | Remote operations: path, parameters, auth requirement |
//! | [`client`] | [`PhishnetClient`] session |
//! | [`config`] | Client configuration |
//! | [`endpoints`] | Typed wrappers, one per operation |
//! | [`error`] | Error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`logging`] | Subscriber setup |
//! | [`params`] | Request parameters |
//! | [`pipeline`] | Build, send, retry, classify |
//! | [`response`] | Decoded API payload |
//! | [`retry`] | Retry budget and backoff |
//! | [`validate`] | Parameter rules |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use phishnet_core::{ClientConfig, Params, PhishnetClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = PhishnetClient::new(ClientConfig::from_env()?)?;
//!
//!     let shows = client
//!         .query_shows(Params::new().with("year", 1997).with("month", 11))
//!         .await?;
//!     println!("{} shows", shows.count.unwrap_or_default());
//!
//!     client.authorize(15, "private-salt").await?;
//!     let mine = client.get_user_shows().await?;
//!     println!("{}", mine.data);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod params;
pub mod pipeline;
pub mod response;
pub mod retry;
pub mod validate;

pub use auth::{unique_hash, AuthNegotiator, AuthState, Authorization};
pub use catalog::{lookup, lookup_path, Endpoint, CATALOG};
pub use client::PhishnetClient;
pub use config::ClientConfig;
pub use endpoints::AttendanceUpdate;
pub use error::{AuthError, ConfigError, PhishnetError, Result, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use logging::{init_logging, LogLevel};
pub use params::{ParamValue, Params};
pub use pipeline::RequestPipeline;
pub use response::ApiResponse;
pub use retry::{Backoff, RetryPolicy};
pub use validate::ParamValidator;
