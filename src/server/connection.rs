// Connection handling module
// Serves one TCP connection and turns each request into exactly one response

use std::any::Any;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpStream;

use super::ServerState;
use crate::http::{Request, Response};
use crate::logger::{self, AccessLogEntry};

/// Accept a connection, enforcing the connection limit, and serve it in a
/// local task watched by `graceful`.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<ServerState>,
    graceful: &GracefulShutdown,
) {
    let settings = &state.settings;

    // Increment counter first, then check limit
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);
    if let Some(max_conn) = settings.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "[{}] Max connections reached: {prev_count}/{max_conn}. Connection rejected.",
                settings.name
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&settings.name, &peer_addr);
    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY: {e}"));
    }

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(settings.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(settings.read_timeout);

    let service_state = Arc::clone(state);
    let conn = builder.serve_connection(
        TokioIo::new(stream),
        service_fn(move |req| {
            let state = Arc::clone(&service_state);
            async move { Ok::<_, Infallible>(handle_request(req, peer_addr, state).await) }
        }),
    );
    let watched = graceful.watch(conn);

    let state = Arc::clone(state);
    tokio::task::spawn_local(async move {
        if let Err(err) = watched.await {
            if err.is_timeout() {
                logger::log_warning(&format!(
                    "[{}] Connection from {peer_addr} timed out waiting for headers",
                    state.settings.name
                ));
            } else {
                logger::log_connection_error(&state.settings.name, &err);
            }
        }
        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Turn one framed request into one response
async fn handle_request(
    req: hyper::Request<Incoming>,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) -> hyper::Response<Full<Bytes>> {
    let started = Instant::now();
    let settings = &state.settings;

    let request = match Request::from_hyper(req, Some(peer_addr), settings.max_body_size).await {
        Ok(request) => request,
        Err(err) => {
            logger::log_warning(&format!("[{}] Rejected request from {peer_addr}: {err}", settings.name));
            return Response::from_request_error(&err)
                .with_header("Connection", "close")
                .into_hyper(&settings.server_name);
        }
    };

    let logged_request = settings.access_log.then(|| request.clone());
    let response = dispatch_isolated(&state, request).await;

    if let Some(req) = logged_request {
        let entry = AccessLogEntry::new(&settings.name, &req, &response, started.elapsed());
        logger::log_access(&entry, &settings.access_log_format);
    }

    response.into_hyper(&settings.server_name)
}

/// Run the routed handler in its own local task
///
/// A handler error or panic becomes a 500 that also closes the connection;
/// nothing a handler does can take down the accept loop.
pub async fn dispatch_isolated(state: &Arc<ServerState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.path().to_string();

    let task_state = Arc::clone(state);
    let outcome =
        tokio::task::spawn_local(async move { task_state.router.dispatch(request).await }).await;

    let reason = match outcome {
        Ok(Ok(response)) => return response,
        Ok(Err(err)) => err.to_string(),
        Err(join_err) if join_err.is_panic() => {
            format!("panicked: {}", panic_message(&*join_err.into_panic()))
        }
        Err(join_err) => join_err.to_string(),
    };

    logger::log_handler_failure(&state.settings.name, &method, &path, &reason);
    Response::internal_error().with_header("Connection", "close")
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
