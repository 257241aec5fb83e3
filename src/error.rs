//! Error types
//!
//! One enum per concern. Request-level errors are turned into responses by
//! the server; listener and registration errors are fatal at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use hyper::Method;
use thiserror::Error;

/// Errors raised while setting up or running a listening socket
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be created or bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The configured host/port pair is not a valid socket address
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Errors raised while turning wire input into a [`crate::http::Request`]
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("request body too large: {size} bytes (max: {limit})")]
    BodyTooLarge { size: u64, limit: u64 },
}

impl RequestError {
    /// Status code sent back to the client for this error
    pub const fn status(&self) -> u16 {
        match self {
            Self::Malformed(_) => 400,
            Self::BodyTooLarge { .. } => 413,
        }
    }
}

/// Errors raised while building a route table
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route already registered: {method} {path}")]
    Duplicate { method: Method, path: String },

    #[error("route path must start with '/': {0}")]
    InvalidPath(String),
}

/// Error returned by a request handler; always answered with a 500
#[derive(Debug, Error)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<FileError> for HandlerError {
    fn from(err: FileError) -> Self {
        Self(err.to_string())
    }
}

/// Errors raised by the file helpers
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// Classify an I/O error for `path`, separating "does not exist" from the rest
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}
