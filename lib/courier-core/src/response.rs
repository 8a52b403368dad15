//! HTTP response handling.
//!
//! [`Response`] is the raw, fully buffered answer returned by a
//! [`Transport`](crate::Transport). Classification into success or
//! [`ApiError`](crate::ApiError) happens in the dispatcher.

use std::collections::HashMap;

use bytes::Bytes;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Hundreds digit of the status code (`404` -> `4`).
    #[must_use]
    pub const fn shortcode(&self) -> u16 {
        self.status / 100
    }

    /// Status is 2xx or 3xx.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.shortcode(), 2 | 3)
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body as text; invalid UTF-8 sequences are replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
