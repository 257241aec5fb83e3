//! Incoming request module
//!
//! Converts hyper's framed request into the owned [`Request`] that handlers
//! receive. Header values must be visible ASCII; anything else is rejected
//! as malformed before the router sees it.

use std::collections::HashMap;
use std::net::SocketAddr;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Version};

use crate::error::RequestError;

/// A fully read HTTP request
///
/// Header names are lower-cased. Repeated headers are joined with `", "`.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    version: Version,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
    peer_addr: Option<SocketAddr>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            version: Version::HTTP_11,
            headers: HashMap::new(),
            body: None,
            peer_addr: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    /// Read a hyper request to completion
    ///
    /// A declared `Content-Length` above `max_body_size` is rejected before
    /// any body bytes are read; chunked bodies are cut off at the same limit.
    pub async fn from_hyper<B>(
        req: hyper::Request<B>,
        peer_addr: Option<SocketAddr>,
        max_body_size: u64,
    ) -> Result<Self, RequestError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let path = parts.uri.path();
        if !path.starts_with('/') {
            return Err(RequestError::Malformed(format!(
                "request target must be an absolute path, got '{path}'"
            )));
        }

        let headers = collect_headers(&parts.headers)?;
        check_content_length(&headers, max_body_size)?;

        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
        let bytes = match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                return Err(RequestError::BodyTooLarge {
                    size: max_body_size.saturating_add(1),
                    limit: max_body_size,
                });
            }
            Err(e) => {
                return Err(RequestError::Malformed(format!(
                    "failed to read request body: {e}"
                )));
            }
        };

        Ok(Self {
            method: parts.method,
            path: path.to_string(),
            query: parts.uri.query().map(ToString::to_string),
            version: parts.version,
            headers,
            body: if bytes.is_empty() { None } else { Some(bytes) },
            peer_addr,
        })
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub const fn version(&self) -> Version {
        self.version
    }

    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub const fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }
}

fn collect_headers(headers: &hyper::HeaderMap) -> Result<HashMap<String, String>, RequestError> {
    let mut collected: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());

    for (name, value) in headers {
        let value = value.to_str().map_err(|_| {
            RequestError::Malformed(format!("header '{name}' contains non-ASCII bytes"))
        })?;

        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    Ok(collected)
}

/// Validate Content-Length header and reject bodies above the limit
fn check_content_length(
    headers: &HashMap<String, String>,
    max_body_size: u64,
) -> Result<(), RequestError> {
    let Some(raw) = headers.get("content-length") else {
        return Ok(());
    };

    let size = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| RequestError::Malformed(format!("invalid Content-Length '{raw}'")))?;

    if size > max_body_size {
        return Err(RequestError::BodyTooLarge {
            size,
            limit: max_body_size,
        });
    }
    Ok(())
}
