// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::listener::create_listener;
use super::{ServerSettings, ServerState};
use crate::error::ServerError;
use crate::logger;
use crate::routing::Router;

/// An HTTP/1.1 server bound to one socket and serving one router
pub struct RequestServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<ServerState>,
}

impl RequestServer {
    /// Bind `addr` and prepare to serve `router`
    ///
    /// Fails with [`ServerError::Bind`] if the port is unavailable. Must be
    /// called from within a tokio runtime.
    pub fn listen(
        addr: SocketAddr,
        router: Router,
        settings: ServerSettings,
    ) -> Result<Self, ServerError> {
        let listener = create_listener(addr)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;
        for route in router.routes() {
            logger::log_route(&settings.name, &route.method, &route.path);
        }
        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(ServerState::new(router, settings)),
        })
    }

    /// Address actually bound (resolves port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve connections until `shutdown` resolves
    ///
    /// Connections run as local tasks, so this must be driven inside a
    /// [`tokio::task::LocalSet`]. After `shutdown` the listener is closed,
    /// in-flight connections get `shutdown_timeout` to finish, and whatever
    /// is still open afterwards is abandoned.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), ServerError> {
        let Self {
            listener,
            local_addr,
            state,
        } = self;
        let name = state.settings.name.clone();
        logger::log_server_start(&name, &local_addr, state.router.len());

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            accept_connection(stream, peer_addr, &state, &graceful);
                        }
                        Err(e) => {
                            logger::log_error(&format!("[{name}] Failed to accept connection: {e}"));
                        }
                    }
                }

                () = &mut shutdown => break,
            }
        }

        // Stop accepting before draining
        drop(listener);
        logger::log_shutdown_started(&name, state.active_connections());

        let drain_timeout = state.settings.shutdown_timeout;
        if tokio::time::timeout(drain_timeout, graceful.shutdown())
            .await
            .is_ok()
        {
            logger::log_shutdown_complete(&name);
        } else {
            logger::log_warning(&format!(
                "[{name}] Drain timed out after {}ms, abandoning {} connection(s)",
                drain_timeout.as_millis(),
                state.active_connections()
            ));
        }

        Ok(())
    }
}
