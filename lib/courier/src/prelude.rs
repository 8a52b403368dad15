//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::{
    ApiClient, ApiError, DiagnosticSink, EndpointConfig, ErrorDetail, ErrorKind, HyperTransport,
    Method, Params, RequestSpec, Result, Transport, Value,
};
pub use serde::{Deserialize, Serialize};
