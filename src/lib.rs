//! Scribd API client library
//!
//! A client for the Scribd document platform's remote procedure API: upload
//! documents, manage their settings, search, authenticate users and wait for
//! server-side conversion to finish.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`sign`] - Request signature derivation
//! - [`params`] - Ordered request parameters and key canonicalization
//! - [`request`] - Payload encoding, transport and XML envelope decoding
//! - [`methods`] - Method wrappers (`docs`, `user`, `thumbnail`)
//! - [`poller`] - Conversion status polling with completion events
//! - [`client`] - [`ScribdClient`], tying the above together
//!
//! # Example
//!
//! ```no_run
//! use scribd_client::methods::docs;
//! use scribd_client::{ClientConfig, Credentials, Params, ScribdClient};
//!
//! # async fn example() -> Result<(), scribd_client::ApiError> {
//! let client = ScribdClient::new(Credentials::new("key", "secret"), ClientConfig::default())?;
//! let documents = client.call(docs::get_list(Params::new())).await?;
//! println!("{documents}");
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod documents;
pub mod methods;
pub mod params;
pub mod poller;
pub mod request;
pub mod sign;
mod user_agent;

// Re-export commonly used types
pub use client::ScribdClient;
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use documents::{ConversionStatus, UploadResult};
pub use params::{ParamValue, Params};
pub use poller::{ConversionEvent, ConversionPoller, PollState, StatusSource};
pub use request::{ApiError, Envelope, MethodCall, Payload, Returns};
pub use sign::sign;
