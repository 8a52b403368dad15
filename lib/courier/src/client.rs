//! Request builder and dispatcher.
//!
//! [`ApiClient`] combines an [`EndpointConfig`] with a [`Transport`]. The four
//! verb operations funnel into [`ApiClient::dispatch`], which validates the
//! call, assembles path and headers, sends the request and classifies the
//! response.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{Instrument, debug, debug_span, warn};

use crate::{
    APPLICATION_JSON, ApiError, EndpointConfig, HyperTransport, Method, Params, Request,
    RequestSpec, Response, Result, Transport, TransportError, from_json, parse_json_body,
    sink::{DiagnosticSink, TracingSink},
    to_json,
};

/// HTTP API client bound to one endpoint.
///
/// Holds no per-call state: clones share the configuration and calls may run
/// concurrently. Each call issues at most one request and is never retried.
///
/// # Example
///
/// ```ignore
/// use courier::{ApiClient, EndpointConfig, RequestSpec};
///
/// let config = EndpointConfig::from_url("https://api.example.com/v1")?;
/// let client = ApiClient::new(config);
///
/// let users = client.get(RequestSpec::new("/users").param("page", "1")).await?;
/// let created = client
///     .post(RequestSpec::new("/users").data(serde_json::json!({"name": "Alice"})))
///     .await?;
/// ```
pub struct ApiClient<T = HyperTransport> {
    config: Arc<EndpointConfig>,
    transport: T,
    sink: Arc<dyn DiagnosticSink>,
}

impl<T: Clone> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: self.transport.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("sink", &self.sink)
            .finish()
    }
}

impl ApiClient<HyperTransport> {
    /// Create a client using the default hyper transport.
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        Self::with_transport(config, HyperTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client using the given transport.
    #[must_use]
    pub fn with_transport(config: EndpointConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the diagnostic sink used when `debug` is set.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Get the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Get a reference to the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    // ========================================================================
    // Verb Operations
    // ========================================================================

    /// Issue a GET request. Any body data in `spec` is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch`].
    pub async fn get(&self, mut spec: RequestSpec) -> Result<Option<Value>> {
        spec.data = None;
        self.dispatch(spec.method(Method::Get)).await
    }

    /// Issue a POST request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch`].
    pub async fn post(&self, spec: RequestSpec) -> Result<Option<Value>> {
        self.dispatch(spec.method(Method::Post)).await
    }

    /// Issue a PUT request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch`].
    pub async fn put(&self, spec: RequestSpec) -> Result<Option<Value>> {
        self.dispatch(spec.method(Method::Put)).await
    }

    /// Issue a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch`].
    pub async fn delete(&self, spec: RequestSpec) -> Result<Option<Value>> {
        self.dispatch(spec.method(Method::Delete)).await
    }

    /// Issue a GET request and deserialize the response into `D`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch_as`].
    pub async fn get_as<D: DeserializeOwned>(&self, mut spec: RequestSpec) -> Result<D> {
        spec.data = None;
        self.dispatch_as(spec.method(Method::Get)).await
    }

    /// Issue a POST request and deserialize the response into `D`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch_as`].
    pub async fn post_as<D: DeserializeOwned>(&self, spec: RequestSpec) -> Result<D> {
        self.dispatch_as(spec.method(Method::Post)).await
    }

    /// Issue a PUT request and deserialize the response into `D`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch_as`].
    pub async fn put_as<D: DeserializeOwned>(&self, spec: RequestSpec) -> Result<D> {
        self.dispatch_as(spec.method(Method::Put)).await
    }

    /// Issue a DELETE request and deserialize the response into `D`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch_as`].
    pub async fn delete_as<D: DeserializeOwned>(&self, spec: RequestSpec) -> Result<D> {
        self.dispatch_as(spec.method(Method::Delete)).await
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Send a request and classify the response.
    ///
    /// Resolves to the parsed JSON body, or `None` when the body is empty.
    ///
    /// # Errors
    ///
    /// - `MISSING_FIELDS` if the method or path is missing; nothing is sent
    /// - `INVALID_REQUEST_BODY` if the data cannot be serialized
    /// - `REQUEST_ERROR` if the transport fails or times out
    /// - `INVALID_JSON_RESPONSE` if the body is not empty and not valid JSON
    /// - `HTTP_STATUS_ERROR` if the status is not 2xx or 3xx
    pub async fn dispatch(&self, spec: RequestSpec) -> Result<Option<Value>> {
        let request = self.prepare(spec)?;

        let span = debug_span!(
            "http_request",
            method = %request.method(),
            path = request.path()
        );

        async move {
            if self.config.debug {
                self.sink.outbound(&request);
            }

            let start = Instant::now();
            debug!("sending request");

            let result = self.send(request).await;

            // Saturating conversion to u64
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(response) => {
                    debug!(status = response.status(), elapsed_ms, "response received");
                    classify(&response)
                }
                Err(err) => {
                    warn!(error = %err, elapsed_ms, "request failed");
                    Err(ApiError::request(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Send a request and deserialize the response into `D`.
    ///
    /// An empty body deserializes from JSON `null`, so `Option<_>` and `()`
    /// accept it.
    ///
    /// # Errors
    ///
    /// Everything [`ApiClient::dispatch`] returns, plus `INVALID_JSON_RESPONSE`
    /// when the body does not match `D`.
    pub async fn dispatch_as<D: DeserializeOwned>(&self, spec: RequestSpec) -> Result<D> {
        let value = self.dispatch(spec).await?;
        from_json(value.unwrap_or(Value::Null))
    }

    /// Validate the call and assemble the outbound request. Performs no I/O.
    fn prepare(&self, spec: RequestSpec) -> Result<Request> {
        let RequestSpec {
            method,
            path,
            params,
            data,
            headers,
        } = spec;

        let mut missing = BTreeMap::new();
        if method.is_none() {
            missing.insert("method".to_string(), "method is missing".to_string());
        }
        if path.is_empty() {
            missing.insert("path".to_string(), "path is missing".to_string());
        }
        let (Some(method), true) = (method, missing.is_empty()) else {
            return Err(ApiError::missing_fields(missing));
        };

        let mut builder = Request::builder(method, &self.config.host, self.config.port)
            .secure(self.config.secure)
            .path(assemble_path(&self.config.path_prefix, &path, &params))
            .header("Content-Type", APPLICATION_JSON)
            .headers(self.config.headers.clone())
            .headers(headers);

        if let Some(auth) = &self.config.auth {
            builder = builder.auth(auth);
        }

        if method.sends_body() {
            let data = data.unwrap_or_else(|| Value::Object(Map::new()));
            builder = builder.body(to_json(&data)?);
        }

        Ok(builder.build())
    }

    async fn send(&self, request: Request) -> std::result::Result<Response, TransportError> {
        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.transport.send(request))
                .await
                .map_err(|_| TransportError::Timeout)?,
            None => self.transport.send(request).await,
        }
    }
}

/// Prefix + path, then `?` and the query string when there are parameters.
fn assemble_path(prefix: &str, path: &str, params: &Params) -> String {
    let mut target = format!("{prefix}{path}");
    if !params.is_empty() {
        target.push('?');
        target.push_str(&params.to_query_string());
    }
    target
}

/// Decode the body, then accept 2xx/3xx and reject everything else.
fn classify(response: &Response) -> Result<Option<Value>> {
    let text = response.text();
    let value = parse_json_body(&text)?;

    if response.is_accepted() {
        Ok(value)
    } else {
        warn!(
            status = response.status(),
            "request failed with HTTP error"
        );
        Err(ApiError::http_status(response.status(), text))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::*;
    use crate::ErrorKind;

    #[derive(Debug, Clone, Copy)]
    struct NoTransport;

    impl Transport for NoTransport {
        async fn send(&self, _request: Request) -> std::result::Result<Response, TransportError> {
            Err(TransportError::connection("no transport"))
        }
    }

    fn client(config: EndpointConfig) -> ApiClient<NoTransport> {
        ApiClient::with_transport(config, NoTransport)
    }

    fn response(status: u16, body: &'static str) -> Response {
        Response::new(status, HashMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn prepare_reports_all_missing_fields() {
        let err = client(EndpointConfig::default())
            .prepare(RequestSpec::default())
            .expect_err("missing fields");

        assert_eq!(err.kind(), ErrorKind::MissingFields);
        let fields = err.fields().expect("fields");
        assert_eq!(
            fields.get("method").map(String::as_str),
            Some("method is missing")
        );
        assert_eq!(fields.get("path").map(String::as_str), Some("path is missing"));
    }

    #[test]
    fn prepare_reports_missing_method_only() {
        let err = client(EndpointConfig::default())
            .prepare(RequestSpec::new("/users"))
            .expect_err("missing method");

        let fields = err.fields().expect("fields");
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("method"));
    }

    #[test]
    fn prepare_assembles_target() {
        let config = EndpointConfig::from_url("https://api.example.com/v1").expect("config");
        let request = client(config)
            .prepare(
                RequestSpec::new("/search")
                    .method(Method::Get)
                    .param("q", "rust lang"),
            )
            .expect("request");

        assert!(request.secure());
        assert_eq!(request.host(), "api.example.com");
        assert_eq!(request.port(), 443);
        assert_eq!(request.path(), "/v1/search?q=rust+lang");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn prepare_layers_headers() {
        let config = EndpointConfig::builder()
            .header("X-Client", "courier")
            .header("X-Env", "config")
            .header("content-type", "application/vnd.api+json")
            .build()
            .expect("config");

        let request = client(config)
            .prepare(
                RequestSpec::new("/items")
                    .method(Method::Post)
                    .header("X-Env", "call"),
            )
            .expect("request");

        assert_eq!(request.header("X-Client"), Some("courier"));
        assert_eq!(request.header("X-Env"), Some("call"));
        assert_eq!(
            request.header("Content-Type"),
            Some("application/vnd.api+json")
        );
        assert_eq!(request.headers().len(), 3);
    }

    #[test]
    fn prepare_defaults_body_to_empty_object() {
        let request = client(EndpointConfig::default())
            .prepare(RequestSpec::new("/items").method(Method::Delete))
            .expect("request");

        assert_eq!(request.body().map(Bytes::as_ref), Some(&b"{}"[..]));
    }

    #[test]
    fn prepare_passes_credential_through() {
        let config = EndpointConfig::builder()
            .auth("user:pass")
            .build()
            .expect("config");
        let request = client(config)
            .prepare(RequestSpec::new("/me").method(Method::Get))
            .expect("request");

        assert_eq!(request.auth(), Some("user:pass"));
    }

    #[test]
    fn assemble_path_skips_empty_params() {
        assert_eq!(assemble_path("/v1", "/users", &Params::new()), "/v1/users");
        assert_eq!(
            assemble_path("", "/users", &Params::encoded("")),
            "/users"
        );
        assert_eq!(
            assemble_path("", "/users", &Params::encoded("a=%20")),
            "/users?a=%20"
        );
    }

    #[test]
    fn classify_success_and_redirect() {
        let value = classify(&response(200, r#"{"a":1}"#)).expect("ok");
        assert_eq!(value, Some(serde_json::json!({"a": 1})));

        let value = classify(&response(304, "")).expect("ok");
        assert_eq!(value, None);
    }

    #[test]
    fn classify_status_error_keeps_raw_body() {
        let err = classify(&response(404, r#"{"msg":"nope"}"#)).expect_err("404");
        assert_eq!(err.kind(), ErrorKind::HttpStatusError);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(r#"{"msg":"nope"}"#));

        let err = classify(&response(500, "")).expect_err("500");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some(""));
    }

    #[test]
    fn classify_decoding_precedes_status() {
        let err = classify(&response(200, "{bad json")).expect_err("bad json");
        assert_eq!(err.kind(), ErrorKind::InvalidJsonResponse);

        let err = classify(&response(502, "Bad Gateway")).expect_err("bad gateway");
        assert_eq!(err.kind(), ErrorKind::InvalidJsonResponse);
    }
}
