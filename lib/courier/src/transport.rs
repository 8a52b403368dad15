//! Transport implementation using hyper-util.

use std::collections::HashMap;

use base64::Engine;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};

use crate::{Request, Response, Transport, TransportError, connector::connector, header};

/// Transport over hyper-util with rustls.
///
/// Plain HTTP or TLS is chosen per request from [`Request::secure`]. Idle
/// connections are never kept: every request opens and closes its own
/// connection. Redirects are not followed.
///
/// # Example
///
/// ```ignore
/// use courier::{ApiClient, EndpointConfig, HyperTransport};
///
/// let config = EndpointConfig::from_url("https://api.example.com/v1")?;
/// let client = ApiClient::with_transport(config, HyperTransport::new());
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport.
    #[must_use]
    pub fn new() -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector());

        Self { inner }
    }

    /// Build a hyper request from a courier request.
    fn build_hyper_request(
        request: &Request,
    ) -> Result<http::Request<Full<Bytes>>, TransportError> {
        let uri = request
            .uri()
            .map_err(|e| TransportError::invalid_request(e.to_string()))?;
        let mut builder = http::Request::builder()
            .method(http::Method::from(request.method()))
            .uri(uri);

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(credential) = request.auth()
            && request.header(header::AUTHORIZATION.as_str()).is_none()
        {
            let encoded = base64::engine::general_purpose::STANDARD.encode(credential);
            builder = builder.header(header::AUTHORIZATION, format!("Basic {encoded}"));
        }

        let body = request.body().cloned().map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| TransportError::invalid_request(e.to_string()))
    }

    /// Extract response headers as a `HashMap`.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> TransportError {
        let msg = err.to_string();
        let detail = std::error::Error::source(&err)
            .map_or_else(|| msg.clone(), |source| format!("{msg}: {source}"));

        Self::classify_detail(&detail)
    }

    /// Handshake failures surface as connect errors, so TLS is checked first.
    fn classify_detail(detail: &str) -> TransportError {
        let lowered = detail.to_lowercase();
        if lowered.contains("ssl") || lowered.contains("tls") || lowered.contains("certificate") {
            return TransportError::tls(detail);
        }

        TransportError::connection(detail)
    }

    async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        let hyper_request = Self::build_hyper_request(&request)?;

        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, response_headers, body))
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn hyper_request_basic_auth_from_credential() {
        let request = Request::builder(Method::Get, "localhost", 8080)
            .path("/users?page=1")
            .auth("user:pass")
            .build();

        let hyper_request = HyperTransport::build_hyper_request(&request).expect("request");

        assert_eq!(hyper_request.method(), http::Method::GET);
        assert_eq!(
            hyper_request.uri().to_string(),
            "http://localhost:8080/users?page=1"
        );
        // "user:pass" -> "dXNlcjpwYXNz"
        assert_eq!(
            hyper_request.headers().get(header::AUTHORIZATION),
            Some(&http::HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        );
    }

    #[test]
    fn hyper_request_keeps_explicit_authorization() {
        let request = Request::builder(Method::Get, "localhost", 8080)
            .header("authorization", "Bearer token123")
            .auth("user:pass")
            .build();

        let hyper_request = HyperTransport::build_hyper_request(&request).expect("request");

        let values: Vec<_> = hyper_request
            .headers()
            .get_all(header::AUTHORIZATION)
            .iter()
            .collect();
        assert_eq!(values, [&http::HeaderValue::from_static("Bearer token123")]);
    }

    #[test]
    fn hyper_request_secure_uri() {
        let request = Request::builder(Method::Post, "api.example.com", 443)
            .secure(true)
            .path("/v1/items")
            .body(Bytes::from_static(b"{}"))
            .build();

        let hyper_request = HyperTransport::build_hyper_request(&request).expect("request");
        assert_eq!(
            hyper_request.uri().to_string(),
            "https://api.example.com:443/v1/items"
        );
    }

    #[test]
    fn hyper_request_path_cannot_change_host() {
        let request = Request::builder(Method::Get, "configured.invalid", 8080)
            .path("@127.0.0.1:9000/hit")
            .build();

        let hyper_request = HyperTransport::build_hyper_request(&request).expect("request");
        assert_eq!(
            hyper_request.uri().to_string(),
            "http://configured.invalid:8080/@127.0.0.1:9000/hit"
        );
        assert_eq!(hyper_request.uri().host(), Some("configured.invalid"));
    }

    #[test]
    fn hyper_request_relative_path() {
        let request = Request::builder(Method::Get, "localhost", 8080)
            .path("users")
            .build();

        let hyper_request = HyperTransport::build_hyper_request(&request).expect("request");
        assert_eq!(
            hyper_request.uri().to_string(),
            "http://localhost:8080/users"
        );
    }

    #[test]
    fn hyper_request_rejects_invalid_path() {
        let request = Request::builder(Method::Get, "localhost", 8080)
            .path("/has space")
            .build();

        let err = HyperTransport::build_hyper_request(&request).expect_err("invalid path");
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn tls_errors_are_classified_case_insensitively() {
        assert_eq!(
            HyperTransport::classify_detail("client error (Connect): TLS handshake failed"),
            TransportError::tls("client error (Connect): TLS handshake failed")
        );
        assert_eq!(
            HyperTransport::classify_detail("SSL alert"),
            TransportError::tls("SSL alert")
        );
        assert_eq!(
            HyperTransport::classify_detail("connection reset"),
            TransportError::connection("connection reset")
        );
    }

    #[test]
    fn hyper_request_rejects_invalid_header() {
        let request = Request::builder(Method::Get, "localhost", 8080)
            .header("X-Bad", "line\nbreak")
            .build();

        let err = HyperTransport::build_hyper_request(&request).expect_err("invalid header");
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn transport_is_debug() {
        let transport = HyperTransport::new();
        assert!(format!("{transport:?}").contains("HyperTransport"));
    }
}
