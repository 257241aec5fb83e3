//! HTTP response building module
//!
//! [`Response`] is what handlers produce. The server turns it into a hyper
//! response exactly once; hyper then frames it with an accurate
//! `Content-Length`.

use std::collections::HashMap;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Method;

use crate::error::RequestError;

/// Content type used for route bodies
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Content type used for plain-text error bodies
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A response produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Empty response with the given status code
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// 200 response with an HTML body
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::new(200)
            .with_header("Content-Type", HTML_CONTENT_TYPE)
            .with_body(body)
    }

    /// Plain-text response with the given status code
    pub fn text(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status)
            .with_header("Content-Type", TEXT_CONTENT_TYPE)
            .with_body(body)
    }

    /// Build 404 Not Found response
    pub fn not_found(method: &Method, path: &str) -> Self {
        Self::text(404, format!("Cannot {method} {path}"))
    }

    /// Build 500 Internal Server Error response
    pub fn internal_error() -> Self {
        Self::text(500, "500 Internal Server Error")
    }

    /// Build the response for a request that never reached the router
    pub fn from_request_error(err: &RequestError) -> Self {
        match err {
            RequestError::Malformed(_) => Self::text(400, "400 Bad Request"),
            RequestError::BodyTooLarge { .. } => Self::text(413, "413 Payload Too Large"),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Convert into a hyper response
    ///
    /// Any handler-supplied `Content-Length` is dropped so hyper computes it
    /// from the body. A `Server` header is added unless the handler set one.
    pub fn into_hyper(self, server_name: &str) -> hyper::Response<Full<Bytes>> {
        let status = self.status;
        let mut builder = hyper::Response::builder().status(status);

        for (name, value) in &self.headers {
            if name == "content-length" {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !self.headers.contains_key("server") {
            builder = builder.header("Server", server_name);
        }

        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = hyper::Response::new(Full::new(Bytes::from(
                "500 Internal Server Error",
            )));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_response() {
        let resp = Response::html("Hello World- landing/home page");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.header("Content-Type"), Some(HTML_CONTENT_TYPE));
        assert_eq!(resp.body().as_ref(), b"Hello World- landing/home page");
    }

    #[test]
    fn test_not_found_names_the_request() {
        let resp = Response::not_found(&Method::GET, "/unknown");
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.body().as_ref(), b"Cannot GET /unknown");
    }

    #[test]
    fn test_request_error_responses() {
        let resp = Response::from_request_error(&RequestError::Malformed("x".into()));
        assert_eq!(resp.status(), 400);

        let resp = Response::from_request_error(&RequestError::BodyTooLarge { size: 2, limit: 1 });
        assert_eq!(resp.status(), 413);
    }

    #[test]
    fn test_into_hyper_sets_server_and_drops_length() {
        let resp = Response::html("abc")
            .with_header("Content-Length", "999")
            .into_hyper("route_server");

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["server"], "route_server");
        assert!(resp.headers().get("content-length").is_none());
        assert_eq!(resp.headers()["content-type"], HTML_CONTENT_TYPE);
    }

    #[test]
    fn test_into_hyper_keeps_handler_server_header() {
        let resp = Response::new(204)
            .with_header("Server", "custom")
            .into_hyper("route_server");
        assert_eq!(resp.headers()["server"], "custom");
    }

    #[test]
    fn test_into_hyper_invalid_status_falls_back_to_500() {
        let resp = Response::new(42).into_hyper("route_server");
        assert_eq!(resp.status(), 500);
    }
}
