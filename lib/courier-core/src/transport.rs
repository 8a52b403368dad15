//! Transport seam.
//!
//! [`Transport`] is the capability that actually moves bytes: it opens a
//! connection to the request's host and port (over TLS when
//! [`Request::secure`] is set), writes the request and buffers the response.
//!
//! The runtime crate ships a hyper-based implementation. Implement this trait
//! directly to substitute a test double or a different HTTP stack.

use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, TransportError};

/// Core transport trait.
///
/// Implementations must not retry and must not follow redirects: every
/// outcome is handed back exactly once.
pub trait Transport: Send + Sync {
    /// Send a request and return the buffered response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained:
    /// - Connection refused, DNS failure, reset
    /// - TLS errors
    /// - The request cannot be encoded as an HTTP message
    fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        (**self).send(request)
    }
}
