//! HTTP request building.
//!
//! Two request shapes live here:
//! - [`RequestSpec`] is what a caller hands to a verb operation: path,
//!   parameters, JSON data and extra headers.
//! - [`Request`] is the fully assembled outbound request given to a
//!   [`Transport`](crate::Transport).
//!
//! # Example
//!
//! ```
//! use courier_core::{Method, Request, RequestSpec};
//!
//! let spec = RequestSpec::new("/users")
//!     .param("page", "1")
//!     .header("Accept", "application/json");
//! assert_eq!(spec.path, "/users");
//!
//! let request = Request::builder(Method::Get, "api.example.com", 443)
//!     .secure(true)
//!     .path("/v1/users?page=1")
//!     .build();
//! assert_eq!(
//!     request.uri().expect("uri").to_string(),
//!     "https://api.example.com:443/v1/users?page=1"
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use http::uri::Scheme;
use serde_json::Value;

use crate::{ApiError, Method, Params, Result};

// ============================================================================
// Request Spec
// ============================================================================

/// Per-call request description.
///
/// Fields left at their defaults mean "not supplied": no method, empty path,
/// no parameters, no data and no extra headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSpec {
    /// HTTP method. Verb operations overwrite it.
    pub method: Option<Method>,
    /// Path appended to the configured path prefix.
    pub path: String,
    /// Query parameters.
    pub params: Params,
    /// JSON body for non-GET requests. Absent means `{}`.
    pub data: Option<Value>,
    /// Per-call headers, layered over the configured ones.
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Creates a spec for the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the method.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = params.into();
        self
    }

    /// Uses an already encoded query string verbatim.
    #[must_use]
    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.params = Params::encoded(query);
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST_BODY` if the value cannot be represented as JSON.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Result<Self> {
        let data = serde_json::to_value(value)
            .map_err(|err| ApiError::invalid_request_body(err.to_string()))?;
        Ok(self.data(data))
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }
}

// ============================================================================
// Outbound Request
// ============================================================================

/// A fully assembled outbound request.
///
/// `path` already carries the path prefix and the encoded query string.
/// The `Debug` output never shows the credential.
#[derive(Clone)]
pub struct Request {
    method: Method,
    secure: bool,
    host: String,
    port: u16,
    path: String,
    headers: BTreeMap<String, String>,
    auth: Option<String>,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, host: impl Into<String>, port: u16) -> RequestBuilder {
        RequestBuilder::new(method, host, port)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Whether the request goes over TLS.
    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// Target host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Target port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Path and query.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Single header value by name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Opaque credential, passed through to the transport.
    #[must_use]
    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Absolute URI: scheme, host, port, path and query.
    ///
    /// Authority and path are set separately, so the path always stays the
    /// request target on the configured host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or the path is not valid in a URI.
    pub fn uri(&self) -> std::result::Result<http::Uri, http::Error> {
        let scheme = if self.secure {
            Scheme::HTTPS
        } else {
            Scheme::HTTP
        };
        http::Uri::builder()
            .scheme(scheme)
            .authority(format!("{}:{}", self.host, self.port))
            .path_and_query(self.path.as_str())
            .build()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("secure", &self.secure)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .finish()
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Creates a new builder targeting `/` over plain HTTP.
    #[must_use]
    pub fn new(method: Method, host: impl Into<String>, port: u16) -> Self {
        Self {
            request: Request {
                method,
                secure: false,
                host: host.into(),
                port,
                path: "/".to_string(),
                headers: BTreeMap::new(),
                auth: None,
                body: None,
            },
        }
    }

    /// Selects TLS.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.request.secure = secure;
        self
    }

    /// Sets the path (and query). A missing leading `/` is added.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        self.request.path = path;
        self
    }

    /// Sets a header, replacing any header with the same name regardless of case.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.request
            .headers
            .retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.request.headers.insert(name, value.into());
        self
    }

    /// Sets multiple headers, later entries winning.
    #[must_use]
    pub fn headers(self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Sets the opaque credential.
    #[must_use]
    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.request.auth = Some(auth.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Bytes) -> Self {
        self.request.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        self.request
    }
}
