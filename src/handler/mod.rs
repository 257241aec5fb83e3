//! Request handler module
//!
//! The two applications this process serves:
//! - `site`: the route-based landing pages plus the stylesheet written at startup
//! - `greeting`: a bare server that answers every request with the same text

pub mod greeting;
pub mod site;

pub use greeting::greeting_router;
pub use site::site_router;
