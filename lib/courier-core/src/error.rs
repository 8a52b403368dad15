//! Error types for courier.
//!
//! Every failed call surfaces as an [`ApiError`]: a kind from the closed
//! [`ErrorKind`] catalog plus an optional [`ErrorDetail`] payload.

use std::collections::BTreeMap;
use std::fmt;

use derive_more::{Display, Error};

// ============================================================================
// Error Kinds
// ============================================================================

/// Closed catalog of error kinds.
///
/// The identifiers returned by [`ErrorKind::as_str`] are stable and callers
/// may branch on them. New kinds are only ever added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required request field (method or path) was not supplied.
    MissingFields,
    /// The response body was not empty but could not be parsed as JSON.
    InvalidJsonResponse,
    /// The transport failed before a response was received.
    RequestError,
    /// The server answered with a status outside the 2xx/3xx range.
    HttpStatusError,
    /// The request body could not be serialized to JSON.
    InvalidRequestBody,
}

impl ErrorKind {
    /// Stable identifier of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::InvalidJsonResponse => "INVALID_JSON_RESPONSE",
            Self::RequestError => "REQUEST_ERROR",
            Self::HttpStatusError => "HTTP_STATUS_ERROR",
            Self::InvalidRequestBody => "INVALID_REQUEST_BODY",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Transport Errors
// ============================================================================

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TransportError {
    /// Network/connection errors (refused, DNS failure, reset).
    #[display("connection error: {_0}")]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    Timeout,

    /// The request could not be turned into a valid HTTP message.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),
}

impl TransportError {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

// ============================================================================
// Error Detail
// ============================================================================

/// Optional payload attached to an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// Field name to message, for validation failures.
    Fields(BTreeMap<String, String>),
    /// The underlying transport failure.
    Transport(TransportError),
    /// Status code and raw response text of a rejected response.
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// Free-form description.
    Message(String),
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => {
                let mut messages = fields.values();
                if let Some(first) = messages.next() {
                    write!(f, "{first}")?;
                }
                for message in messages {
                    write!(f, ", {message}")?;
                }
                Ok(())
            }
            Self::Transport(err) => write!(f, "{err}"),
            Self::Status { status, .. } => write!(f, "status {status}"),
            Self::Message(message) => write!(f, "{message}"),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Error returned by every courier call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ErrorKind,
    detail: Option<ErrorDetail>,
}

/// Result type alias using [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error without detail.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self { kind, detail: None }
    }

    /// Create an error with detail.
    #[must_use]
    pub const fn with_detail(kind: ErrorKind, detail: ErrorDetail) -> Self {
        Self {
            kind,
            detail: Some(detail),
        }
    }

    /// Create a `MISSING_FIELDS` error from field/message pairs.
    #[must_use]
    pub fn missing_fields(fields: BTreeMap<String, String>) -> Self {
        Self::with_detail(ErrorKind::MissingFields, ErrorDetail::Fields(fields))
    }

    /// Create an `INVALID_JSON_RESPONSE` error.
    #[must_use]
    pub const fn invalid_json_response() -> Self {
        Self::new(ErrorKind::InvalidJsonResponse)
    }

    /// Create a `REQUEST_ERROR` wrapping a transport failure.
    #[must_use]
    pub const fn request(error: TransportError) -> Self {
        Self::with_detail(ErrorKind::RequestError, ErrorDetail::Transport(error))
    }

    /// Create an `HTTP_STATUS_ERROR` carrying the status and raw body.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::with_detail(
            ErrorKind::HttpStatusError,
            ErrorDetail::Status {
                status,
                body: body.into(),
            },
        )
    }

    /// Create an `INVALID_REQUEST_BODY` error.
    #[must_use]
    pub fn invalid_request_body(message: impl Into<String>) -> Self {
        Self::with_detail(
            ErrorKind::InvalidRequestBody,
            ErrorDetail::Message(message.into()),
        )
    }

    /// The error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The detail payload, if any.
    #[must_use]
    pub const fn detail(&self) -> Option<&ErrorDetail> {
        self.detail.as_ref()
    }

    /// Missing field messages, if this is a validation error.
    #[must_use]
    pub const fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match &self.detail {
            Some(ErrorDetail::Fields(fields)) => Some(fields),
            _ => None,
        }
    }

    /// The underlying transport failure, if any.
    #[must_use]
    pub const fn transport(&self) -> Option<&TransportError> {
        match &self.detail {
            Some(ErrorDetail::Transport(err)) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a status error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match &self.detail {
            Some(ErrorDetail::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this is a status error.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match &self.detail {
            Some(ErrorDetail::Status { body, .. }) => Some(body),
            _ => None,
        }
    }

    /// Returns `true` if a required field was missing.
    #[must_use]
    pub const fn is_missing_fields(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingFields)
    }

    /// Returns `true` if the transport failed.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(self.kind, ErrorKind::RequestError)
    }

    /// Returns `true` if the transport timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.transport(), Some(TransportError::Timeout))
    }

    /// Returns `true` if this is a 404 Not Found status error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Try to decode the body of a status error as JSON.
    ///
    /// Returns `None` when this is not a status error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct Problem {
    ///     msg: String,
    /// }
    ///
    /// if let Err(err) = client.get(RequestSpec::new("/users/42")).await {
    ///     if let Some(Ok(problem)) = err.decode_body::<Problem>() {
    ///         eprintln!("server said: {}", problem.msg);
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| {
            let value = serde_json::from_str::<serde_json::Value>(body)
                .map_err(|_| Self::invalid_json_response())?;
            crate::from_json(value)
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.transport()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        Self::request(error)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn missing(pairs: &[(&str, &str)]) -> ApiError {
        ApiError::missing_fields(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn kind_identifiers_are_stable() {
        assert_eq!(ErrorKind::MissingFields.as_str(), "MISSING_FIELDS");
        assert_eq!(
            ErrorKind::InvalidJsonResponse.as_str(),
            "INVALID_JSON_RESPONSE"
        );
        assert_eq!(ErrorKind::RequestError.as_str(), "REQUEST_ERROR");
        assert_eq!(ErrorKind::HttpStatusError.as_str(), "HTTP_STATUS_ERROR");
        assert_eq!(ErrorKind::InvalidRequestBody.to_string(), "INVALID_REQUEST_BODY");
    }

    #[test]
    fn kind_display_matches_identifier() {
        for kind in [
            ErrorKind::MissingFields,
            ErrorKind::InvalidJsonResponse,
            ErrorKind::RequestError,
            ErrorKind::HttpStatusError,
            ErrorKind::InvalidRequestBody,
        ] {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn error_display() {
        let err = missing(&[("method", "method is missing"), ("path", "path is missing")]);
        assert_eq!(
            err.to_string(),
            "MISSING_FIELDS: method is missing, path is missing"
        );

        let err = ApiError::invalid_json_response();
        assert_eq!(err.to_string(), "INVALID_JSON_RESPONSE");

        let err = ApiError::request(TransportError::connection("refused"));
        assert_eq!(err.to_string(), "REQUEST_ERROR: connection error: refused");

        let err = ApiError::http_status(404, r#"{"msg":"nope"}"#);
        assert_eq!(err.to_string(), "HTTP_STATUS_ERROR: status 404");
    }

    #[test]
    fn error_fields() {
        let err = missing(&[("path", "path is missing")]);
        assert!(err.is_missing_fields());
        let fields = err.fields().expect("fields");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("path").map(String::as_str), Some("path is missing"));
        assert!(err.status().is_none());
    }

    #[test]
    fn error_status() {
        let err = ApiError::http_status(404, r#"{"msg":"nope"}"#);
        assert_eq!(err.kind(), ErrorKind::HttpStatusError);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(r#"{"msg":"nope"}"#));
        assert!(err.is_not_found());

        let err = ApiError::invalid_json_response();
        assert!(err.status().is_none());
        assert!(err.body().is_none());
        assert!(err.detail().is_none());
    }

    #[test]
    fn error_source_is_transport_cause() {
        let err = ApiError::from(TransportError::Timeout);
        assert!(err.is_request_error());
        assert!(err.is_timeout());
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "request timeout");

        assert!(ApiError::invalid_json_response().source().is_none());
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Problem {
            msg: String,
        }

        let err = ApiError::http_status(404, r#"{"msg":"nope"}"#);
        let decoded = err.decode_body::<Problem>().expect("status error");
        assert_eq!(
            decoded.expect("should decode"),
            Problem {
                msg: "nope".to_string()
            }
        );

        let err = ApiError::http_status(500, "Internal Server Error");
        let decoded = err.decode_body::<Problem>().expect("status error");
        assert_eq!(
            decoded.expect_err("not json").kind(),
            ErrorKind::InvalidJsonResponse
        );

        assert!(ApiError::invalid_json_response()
            .decode_body::<Problem>()
            .is_none());
    }
}
