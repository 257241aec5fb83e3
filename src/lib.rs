//! Two small HTTP/1.1 servers on one runtime: a route-based site and a
//! greeting server that answers every request the same way.

pub mod config;
pub mod error;
pub mod files;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
