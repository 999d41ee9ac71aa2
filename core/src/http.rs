//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network; the caller (host) executes the actual I/O.
//!
//! Every request this API issues is a bodiless GET, so `HttpRequest` carries
//! only the fully resolved URL and the (always empty) header list.

/// The only method the operadoras API is called with.
pub const METHOD: &str = "GET";

/// An HTTP GET request described as plain data.
///
/// Built by `OperadorasClient::build_*` methods. `url` is absolute: origin,
/// base path, endpoint suffix and query string already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`. The body is
/// the full response text, read before any JSON parsing happens.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
