//! Body serialization utilities.

use bytes::Bytes;
use serde_json::Value;

use crate::{ApiError, ErrorDetail, ErrorKind, Result};

/// Default `Content-Type` of every request.
pub const APPLICATION_JSON: &str = "application/json";

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns `INVALID_REQUEST_BODY` if JSON serialization fails.
///
/// # Example
///
/// ```
/// use courier_core::to_json;
///
/// let bytes = to_json(&serde_json::json!({"a": 1})).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"a":1}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|err| ApiError::invalid_request_body(err.to_string()))
}

/// Parse a response body as JSON.
///
/// An empty body is an absent value, not an error. Whitespace is not empty.
///
/// # Errors
///
/// Returns `INVALID_JSON_RESPONSE` if the body is not empty and not valid JSON.
///
/// # Example
///
/// ```
/// use courier_core::parse_json_body;
///
/// assert_eq!(parse_json_body("").expect("empty"), None);
/// assert_eq!(parse_json_body("[1]").expect("json"), Some(serde_json::json!([1])));
/// assert!(parse_json_body("{bad json").is_err());
/// ```
pub fn parse_json_body(text: &str) -> Result<Option<Value>> {
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|_| ApiError::invalid_json_response())
}

/// Deserialize a JSON value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error detail names the field that failed
/// (e.g. `user.address.city`).
///
/// # Errors
///
/// Returns `INVALID_JSON_RESPONSE` with a message detail if the value does not
/// match `T`.
pub fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        ApiError::with_detail(
            ErrorKind::InvalidJsonResponse,
            ErrorDetail::Message(format!("at '{}': {}", err.path(), err.inner())),
        )
    })
}
