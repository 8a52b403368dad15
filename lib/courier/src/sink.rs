//! Diagnostic sink for outbound requests.
//!
//! When [`EndpointConfig::debug`](crate::EndpointConfig::debug) is set, the
//! client hands every assembled request to its sink before sending it. The
//! default sink writes a `tracing` event; install your own with
//! [`ApiClient::with_sink`](crate::ApiClient::with_sink).

use std::fmt;

use tracing::info;

use crate::Request;

/// Receives the description of each outbound request.
pub trait DiagnosticSink: fmt::Debug + Send + Sync {
    /// Called once per request, before the transport is invoked.
    fn outbound(&self, request: &Request);
}

/// Sink that logs outbound requests using `tracing`.
///
/// The credential is never logged.
///
/// # Example
///
/// ```ignore
/// use courier::{ApiClient, EndpointConfig};
///
/// tracing_subscriber::fmt().init();
///
/// let config = EndpointConfig::builder().url("http://localhost:3000").debug(true).build()?;
/// let client = ApiClient::new(config);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn outbound(&self, request: &Request) {
        info!(
            host = request.host(),
            port = request.port(),
            path = request.path(),
            method = %request.method(),
            headers = ?request.headers(),
            "outbound request"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn tracing_sink_accepts_request() {
        let request = Request::builder(Method::Get, "localhost", 8080)
            .path("/health")
            .auth("user:secret")
            .build();

        TracingSink.outbound(&request);
    }
}
