//! Minimal JSON-over-HTTP API client.
//!
//! Configure an endpoint once, then issue GET/POST/PUT/DELETE calls that
//! resolve to the parsed JSON body or a single typed [`ApiError`].
//!
//! # Example
//!
//! ```ignore
//! use courier::prelude::*;
//!
//! let config = EndpointConfig::from_url("https://api.example.com/v1")?;
//! let client = ApiClient::new(config);
//!
//! match client.get(RequestSpec::new("/users/42")).await {
//!     Ok(user) => println!("{user:?}"),
//!     Err(err) if err.kind() == ErrorKind::HttpStatusError => {
//!         eprintln!("server answered {:?}: {:?}", err.status(), err.body());
//!     }
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

mod client;
mod config;
mod connector;
pub mod prelude;
mod sink;
mod transport;

// Re-export client types
pub use client::ApiClient;
pub use config::{
    ConfigError, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SECURE_PORT, EndpointConfig,
    EndpointConfigBuilder,
};
pub use sink::{DiagnosticSink, TracingSink};
pub use transport::HyperTransport;

// Re-export core types
pub use courier_core::{
    APPLICATION_JSON, ApiError, ErrorDetail, ErrorKind, Method, Params, Request, RequestBuilder,
    RequestSpec, Response, Result, Transport, TransportError, from_json, header, parse_json_body,
    to_json,
};

// Re-export JSON value type used in results
pub use serde_json::Value;
