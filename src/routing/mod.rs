//! Routing module
//!
//! Exact `(method, path)` matching with a fallback handler.

pub mod router;

pub use router::{handler, Handler, HandlerFuture, Route, Router};
