//! Route table and dispatch
//!
//! Routes are keyed by a normalized `(method, path)` pair, so lookup is a
//! single hash probe. The table is built once at startup and never mutated
//! while serving.
//!
//! Matching is case-sensitive: `/Shorts` does not reach a `/shorts` route.
//! Express-style routers fold case by default; this one does not.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::Method;

use crate::error::{HandlerError, RouteError};
use crate::http::{Request, Response};

/// Future returned by a handler
///
/// Not `Send`: handlers run on the single-threaded local executor.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, HandlerError>>>>;

/// A function producing a Response from a Request
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Wrap an async closure as a [`Handler`]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + 'static,
{
    Arc::new(move |req| Box::pin(f(req)) as HandlerFuture)
}

/// Normalized lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: Method,
    path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: normalize_path(path).to_string(),
        }
    }
}

/// A registered (method, path) pair bound to a handler
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: Handler,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Exact-match router with a configurable fallback
pub struct Router {
    routes: HashMap<RouteKey, Route>,
    fallback: Handler,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self
            .routes
            .values()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        keys.sort();
        f.debug_struct("Router")
            .field("routes", &keys)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create an empty router whose fallback answers 404
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            fallback: handler(|req: Request| async move {
                Ok(Response::not_found(req.method(), req.path()))
            }),
        }
    }

    /// Register a handler for `(method, path)`
    ///
    /// Fails without touching the existing entry if the pair is taken.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
    ) -> Result<(), RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::InvalidPath(path.to_string()));
        }

        let key = RouteKey::new(method.clone(), path);
        if self.routes.contains_key(&key) {
            return Err(RouteError::Duplicate {
                method,
                path: key.path,
            });
        }

        let route = Route {
            method,
            path: key.path.clone(),
            handler,
        };
        self.routes.insert(key, route);
        Ok(())
    }

    pub fn get<F, Fut>(&mut self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + 'static,
    {
        self.register(Method::GET, path, handler(f))
    }

    pub fn post<F, Fut>(&mut self, path: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + 'static,
    {
        self.register(Method::POST, path, handler(f))
    }

    /// Replace the handler used when no route matches
    pub fn set_fallback(&mut self, fallback: Handler) {
        self.fallback = fallback;
    }

    /// Find the route for `(method, path)`
    ///
    /// `HEAD` falls back to the `GET` route of the same path.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Route> {
        let key = RouteKey::new(method.clone(), path);
        self.routes.get(&key).or_else(|| {
            if *method == Method::HEAD {
                self.routes.get(&RouteKey::new(Method::GET, path))
            } else {
                None
            }
        })
    }

    /// Build the handler future for a request without polling it
    pub fn route(&self, req: Request) -> HandlerFuture {
        let target = self
            .lookup(req.method(), req.path())
            .map_or(&self.fallback, |route| &route.handler);
        target(req)
    }

    /// Match a request to a route and run its handler
    pub async fn dispatch(&self, req: Request) -> Result<Response, HandlerError> {
        self.route(req).await
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered routes, for startup logging
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop a single trailing slash, keeping the root path intact
fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
