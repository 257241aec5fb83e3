// Configuration module entry point
// Loads layered configuration: defaults, optional config file, environment

mod types;

use std::net::SocketAddr;

pub use types::{Config, FilesConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

use crate::error::ServerError;

/// Environment variable prefix, e.g. `ROUTE_SERVER_SERVER__SITE_PORT=8080`
const ENV_PREFIX: &str = "ROUTE_SERVER";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, without reading files or the environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.site_port", 4000)?
            .set_default("server.greeting_port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "route_server/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("files.stylesheet_path", "new.css")?
            .set_default("files.stylesheet_content", "body{color: red}")?
            .set_default("files.image_path", "eldohub.jpg")
    }

    pub fn site_addr(&self) -> Result<SocketAddr, ServerError> {
        socket_addr(&self.server.host, self.server.site_port)
    }

    pub fn greeting_addr(&self) -> Result<SocketAddr, ServerError> {
        socket_addr(&self.server.host, self.server.greeting_port)
    }
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    let raw = format!("{host}:{port}");
    raw.parse().map_err(|_| ServerError::InvalidAddress(raw))
}
