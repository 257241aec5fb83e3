// Server module entry point
// Listener creation, connection serving, the accept loop and signal handling

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub use listener::create_listener;
pub use server_loop::RequestServer;
pub use signal::{start_signal_handler, SignalHandler};

use crate::config::Config;
use crate::routing::Router;

/// Per-server settings derived from the shared configuration
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Label used in log lines (site, greeting)
    pub name: String,
    /// Value of the `Server` response header
    pub server_name: String,
    pub max_body_size: u64,
    pub keep_alive: bool,
    pub read_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub max_connections: Option<u64>,
    pub access_log: bool,
    pub access_log_format: String,
}

impl ServerSettings {
    pub fn from_config(name: &str, config: &Config) -> Self {
        Self {
            name: name.to_string(),
            server_name: config.http.server_name.clone(),
            max_body_size: config.http.max_body_size,
            keep_alive: config.performance.keep_alive,
            read_timeout: Duration::from_secs(config.performance.read_timeout),
            shutdown_timeout: Duration::from_secs(config.performance.shutdown_timeout),
            max_connections: config.performance.max_connections,
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: "server".to_string(),
            server_name: "route_server".to_string(),
            max_body_size: 1_048_576,
            keep_alive: true,
            read_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(10),
            max_connections: None,
            access_log: false,
            access_log_format: "combined".to_string(),
        }
    }
}

/// State shared by every connection task of one server
///
/// The route table is immutable once serving starts; the connection counter
/// is the only mutable field.
pub struct ServerState {
    pub router: Router,
    pub settings: ServerSettings,
    pub active_connections: AtomicUsize,
}

impl ServerState {
    pub fn new(router: Router, settings: ServerSettings) -> Self {
        Self {
            router,
            settings,
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
