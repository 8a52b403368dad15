//! Core types and traits for the courier HTTP client.
//!
//! This crate provides the transport-agnostic vocabulary used by courier:
//! - [`ErrorKind`], [`ApiError`] and [`ErrorDetail`] - the error catalog
//! - [`TransportError`] - failures reported by a transport
//! - [`Method`] - HTTP method enum
//! - [`Params`] - query parameters (mapping or pre-encoded)
//! - [`RequestSpec`] - per-call request description
//! - [`Request`] and [`RequestBuilder`] - assembled outbound request
//! - [`Response`] - buffered HTTP response
//! - [`Transport`] - the injected transport capability

mod body;
mod error;
mod method;
mod params;
pub mod prelude;
mod request;
mod response;
mod transport;

pub use body::{APPLICATION_JSON, from_json, parse_json_body, to_json};
pub use error::{ApiError, ErrorDetail, ErrorKind, Result, TransportError};
pub use method::Method;
pub use params::Params;
pub use request::{Request, RequestBuilder, RequestSpec};
pub use response::Response;
pub use transport::Transport;

// Re-export http crate header names
pub use http::header;
