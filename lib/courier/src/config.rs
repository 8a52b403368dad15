//! Endpoint configuration types.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use derive_more::{Display, Error, From};
use url::Url;

/// Host used when neither a URL nor an explicit host is given.
pub const DEFAULT_HOST: &str = "localhost";
/// Port used over plain HTTP when no port is given.
pub const DEFAULT_PORT: u16 = 8080;
/// Port used over TLS when no port is given.
pub const DEFAULT_SECURE_PORT: u16 = 443;

/// Error raised while building an [`EndpointConfig`].
#[derive(Debug, Display, Error, From)]
pub enum ConfigError {
    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The URL scheme is neither `http` nor `https`.
    #[display("unsupported URL scheme: {_0}")]
    #[from(skip)]
    UnsupportedScheme(#[error(not(source))] String),
}

/// Resolved endpoint configuration of an [`ApiClient`](crate::ApiClient).
///
/// `port` is always concrete. The `Debug` output never shows the credential.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Target host.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Whether requests go over TLS.
    pub secure: bool,
    /// Prepended to every call path.
    pub path_prefix: String,
    /// Opaque credential passed through to the transport.
    pub auth: Option<String>,
    /// Default headers, layered over `Content-Type` and under per-call headers.
    pub headers: BTreeMap<String, String>,
    /// Emit every outbound request to the diagnostic sink.
    pub debug: bool,
    /// Per-request timeout. `None` waits for the transport indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            secure: false,
            path_prefix: String::new(),
            auth: None,
            headers: BTreeMap::new(),
            debug: false,
            timeout: None,
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("path_prefix", &self.path_prefix)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers)
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EndpointConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EndpointConfigBuilder {
        EndpointConfigBuilder::default()
    }

    /// Configuration derived from a full endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or is not `http`/`https`.
    pub fn from_url(url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder().url(url).build()
    }
}

/// Endpoint fields derived from a URL.
struct UrlParts {
    host: Option<String>,
    port: Option<u16>,
    secure: bool,
    path_prefix: String,
}

impl UrlParts {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw)?;
        let secure = match url.scheme() {
            "https" => true,
            "http" => false,
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        };

        Ok(Self {
            host: url.host_str().map(str::to_string),
            port: url.port_or_known_default(),
            secure,
            // "https://api.example.com" has path "/": no prefix
            path_prefix: url.path().trim_end_matches('/').to_string(),
        })
    }
}

/// Builder for [`EndpointConfig`].
///
/// When a URL is given, host, port, secure flag and path prefix are derived
/// from it. Any field set explicitly wins over the derived value.
#[derive(Clone, Default)]
pub struct EndpointConfigBuilder {
    url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    secure: Option<bool>,
    path_prefix: Option<String>,
    auth: Option<String>,
    headers: BTreeMap<String, String>,
    debug: Option<bool>,
    timeout: Option<Duration>,
}

impl fmt::Debug for EndpointConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfigBuilder")
            .field("url", &self.url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("path_prefix", &self.path_prefix)
            .field("headers", &self.headers)
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EndpointConfigBuilder {
    /// Set the full endpoint URL (e.g. `https://api.example.com/v1`).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Select TLS.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Set the path prefix.
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Set the opaque credential (`user:password`).
    #[must_use]
    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add multiple default headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Emit outbound requests to the diagnostic sink.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or is not `http`/`https`.
    pub fn build(self) -> Result<EndpointConfig, ConfigError> {
        let derived = self.url.as_deref().map(UrlParts::parse).transpose()?;

        let secure = self
            .secure
            .or(derived.as_ref().map(|parts| parts.secure))
            .unwrap_or(false);
        let host = self
            .host
            .or_else(|| derived.as_ref().and_then(|parts| parts.host.clone()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = self
            .port
            .or(derived.as_ref().and_then(|parts| parts.port))
            .unwrap_or(if secure { DEFAULT_SECURE_PORT } else { DEFAULT_PORT });
        let path_prefix = self
            .path_prefix
            .or_else(|| derived.map(|parts| parts.path_prefix))
            .unwrap_or_default();

        Ok(EndpointConfig {
            host,
            port,
            secure,
            path_prefix,
            auth: self.auth,
            headers: self.headers,
            debug: self.debug.unwrap_or(false),
            timeout: self.timeout,
        })
    }
}
