//! HTTP protocol layer module
//!
//! Owned request/response types handed to route handlers, plus the
//! conversions to and from hyper's wire types.

pub mod mime;
pub mod request;
pub mod response;

pub use request::Request;
pub use response::Response;
