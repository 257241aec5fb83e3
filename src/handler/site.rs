//! Route-based site
//!
//! Exact-match routes with a 404 fallback.

use std::path::Path;
use std::sync::Arc;

use crate::config::FilesConfig;
use crate::error::{HandlerError, RouteError};
use crate::files;
use crate::http::{Request, Response};
use crate::routing::Router;

pub const HOME_BODY: &str = "Hello World- landing/home page";
pub const SHORTS_BODY: &str = "Hello World- your are seeing shorts route";
pub const ACCOUNT_BODY: &str = "Hello World-- you are accessing your account info";

async fn home(_req: Request) -> Result<Response, HandlerError> {
    Ok(Response::html(HOME_BODY))
}

async fn shorts(_req: Request) -> Result<Response, HandlerError> {
    Ok(Response::html(SHORTS_BODY))
}

async fn account(_req: Request) -> Result<Response, HandlerError> {
    Ok(Response::html(ACCOUNT_BODY))
}

/// Build the site's route table
///
/// The stylesheet is served at `/<file name>` straight from disk, so edits
/// to the file show up without a restart.
pub fn site_router(files_config: &FilesConfig) -> Result<Router, RouteError> {
    let mut router = Router::new();
    router.get("/", home)?;
    router.get("/shorts", shorts)?;
    router.get("/account", account)?;

    let stylesheet: Arc<Path> = Arc::from(Path::new(&files_config.stylesheet_path));
    if let Some(file_name) = stylesheet.file_name().and_then(|n| n.to_str()) {
        let route_path = format!("/{file_name}");
        router.get(&route_path, move |_req| {
            let path = Arc::clone(&stylesheet);
            async move { Ok(files::respond_with_file(&path).await) }
        })?;
    }

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Method;

    fn files_config(stylesheet_path: &str) -> FilesConfig {
        FilesConfig {
            stylesheet_path: stylesheet_path.to_string(),
            stylesheet_content: "body{color: red}".to_string(),
            image_path: "eldohub.jpg".to_string(),
        }
    }

    async fn get(router: &Router, path: &str) -> Response {
        router
            .dispatch(Request::new(Method::GET, path))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_registered_routes() {
        let router = site_router(&files_config("new.css")).unwrap();
        assert_eq!(router.len(), 4);

        for (path, body) in [
            ("/", HOME_BODY),
            ("/shorts", SHORTS_BODY),
            ("/account", ACCOUNT_BODY),
        ] {
            let resp = get(&router, path).await;
            assert_eq!(resp.status(), 200, "{path}");
            assert_eq!(resp.body().as_ref(), body.as_bytes(), "{path}");
            assert_eq!(
                resp.header("content-type"),
                Some("text/html; charset=utf-8")
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let router = site_router(&files_config("new.css")).unwrap();
        assert_eq!(get(&router, "/unknown").await.status(), 404);
    }

    #[tokio::test]
    async fn test_stylesheet_route() {
        let dir = std::env::temp_dir().join(format!("route_server_site_{}", std::process::id()));
        let path = dir.join("site.css");
        files::write_static(&path, "body{color: red}").await.unwrap();

        let router = site_router(&files_config(&path.to_string_lossy())).unwrap();
        let resp = get(&router, "/site.css").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert_eq!(resp.body().as_ref(), b"body{color: red}");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_stylesheet_colliding_with_route_is_rejected() {
        // a file named like an existing route cannot shadow it
        let err = site_router(&files_config("static/shorts")).unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }
}
