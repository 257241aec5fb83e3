//! Bare greeting server
//!
//! No routes: every request lands on the fallback, which logs the request
//! headers and answers 200 with the greeting.

use crate::http::{Request, Response};
use crate::logger;
use crate::routing::{handler, Router};

pub const GREETING_BODY: &str = "Hello, this is your server responding to a request!!! Albert One";

pub fn greeting_router(log_headers: bool) -> Router {
    let mut router = Router::new();
    router.set_fallback(handler(move |req: Request| async move {
        if log_headers {
            logger::log_request_headers(req.headers());
        }
        Ok(Response::new(200).with_body(GREETING_BODY))
    }));
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{RequestServer, ServerSettings};
    use hyper::Method;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::Notify;
    use tokio::task::LocalSet;

    #[tokio::test]
    async fn test_every_request_gets_greeting() {
        let router = greeting_router(false);
        assert!(router.is_empty());

        for (method, path) in [
            (Method::GET, "/"),
            (Method::POST, "/submit"),
            (Method::GET, "/any/where?x=1"),
        ] {
            let resp = router
                .dispatch(Request::new(method, path).with_header("Accept", "*/*"))
                .await
                .unwrap();
            assert_eq!(resp.status(), 200);
            assert_eq!(resp.body().as_ref(), GREETING_BODY.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_greeting_on_the_wire() {
        LocalSet::new()
            .run_until(async {
                let server = RequestServer::listen(
                    "127.0.0.1:0".parse().unwrap(),
                    greeting_router(false),
                    ServerSettings::default(),
                )
                .unwrap();
                let addr = server.local_addr();
                let stop = Arc::new(Notify::new());
                let signal = Arc::clone(&stop);
                let handle =
                    tokio::task::spawn_local(server.run(async move { signal.notified().await }));

                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /whatever HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut buf = Vec::new();
                let _ = stream.read_to_end(&mut buf).await;
                let raw = String::from_utf8_lossy(&buf);

                assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "got: {raw}");
                assert!(raw.to_ascii_lowercase().contains("content-length: 64\r\n"), "got: {raw}");
                assert!(raw.ends_with(&format!("\r\n\r\n{GREETING_BODY}")), "got: {raw}");

                stop.notify_one();
                handle.await.unwrap().unwrap();
            })
            .await;
    }
}
