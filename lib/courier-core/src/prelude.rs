//! Prelude module for convenient imports.

pub use crate::{
    ApiError, ErrorDetail, ErrorKind, Method, Params, Request, RequestSpec, Response, Result,
    Transport, TransportError,
};
