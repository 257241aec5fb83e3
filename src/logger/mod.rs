//! Logger module
//!
//! Provides logging utilities for the HTTP servers including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::config::Config;
use crate::files::FileMetadata;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse::<Level>().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, falling back to info");
        Level::Info
    });
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write a leveled message; before `init` everything goes to stdout/stderr
fn write(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level <= Level::Warn => eprintln!("{message}"),
        None => println!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(name: &str, addr: &SocketAddr, routes: usize) {
    write(Level::Info, "======================================");
    write(Level::Info, &format!("[{name}] Server started successfully"));
    write(Level::Info, &format!("[{name}] Listening on: http://{addr}"));
    write(Level::Info, &format!("[{name}] Registered routes: {routes}"));
    write(Level::Info, "======================================");
}

pub fn log_config(config: &Config) {
    write(Level::Info, "[CONFIG] Loaded configuration:");
    write(Level::Info, &format!("  - Log level: {}", config.logging.level));
    write(
        Level::Info,
        &format!("  - Max body size: {} bytes", config.http.max_body_size),
    );
    write(
        Level::Info,
        &format!("  - Max connections: {:?}", config.performance.max_connections),
    );
    if let Some(ref path) = config.logging.access_log_file {
        write(Level::Info, &format!("  - Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(Level::Info, &format!("  - Error log: {path}"));
    }
}

pub fn log_route(name: &str, method: &hyper::Method, path: &str) {
    write(Level::Debug, &format!("[{name}] Route: {method} {path}"));
}

pub fn log_connection_accepted(name: &str, peer_addr: &SocketAddr) {
    write(
        Level::Debug,
        &format!("[{name}] Connection accepted from: {peer_addr}"),
    );
}

pub fn log_connection_error(name: &str, err: &impl std::fmt::Display) {
    write(
        Level::Error,
        &format!("[{name}] [ERROR] Failed to serve connection: {err}"),
    );
}

pub fn log_request_headers(headers: &HashMap<String, String>) {
    let mut names: Vec<_> = headers.iter().collect();
    names.sort();
    write(Level::Info, &format!("[Headers] Count: {}", names.len()));
    for (name, value) in names {
        write(Level::Info, &format!("  {name}: {value}"));
    }
}

pub fn log_handler_failure(name: &str, method: &hyper::Method, path: &str, reason: &str) {
    write(
        Level::Error,
        &format!("[{name}] [ERROR] Handler for {method} {path} failed: {reason}"),
    );
}

pub fn log_shutdown_started(name: &str, in_flight: usize) {
    write(
        Level::Info,
        &format!("[{name}] Shutdown requested, draining {in_flight} connection(s)"),
    );
}

pub fn log_shutdown_complete(name: &str) {
    write(Level::Info, &format!("[{name}] All connections closed"));
}

pub fn log_file_written(path: &str) {
    write(Level::Info, &format!("[Files] {path} created successfully"));
}

pub fn log_file_status(path: &str, meta: &FileMetadata) {
    let rendered = serde_json::to_string_pretty(meta).unwrap_or_else(|e| e.to_string());
    write(Level::Info, &format!("[Files] Status of {path}:\n{rendered}"));
    if let Some(perms) = meta.permissions_string() {
        write(Level::Info, &format!("[Files] Permissions: {perms}"));
    }
}

pub fn log_error(message: &str) {
    write(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
