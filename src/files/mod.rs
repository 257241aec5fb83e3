//! File helpers
//!
//! Writing a static file, reading a file's metadata, and serving a file as a
//! response. Each call is independent; writing the same content to the same
//! path twice leaves the same file behind.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::fs;

use crate::error::FileError;
use crate::http::{mime, Response};
use crate::logger;

/// Metadata reported for a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub size: u64,
    pub is_file: bool,
    pub is_dir: bool,
    pub readonly: bool,
    /// Unix permission bits, `None` on other platforms
    pub mode: Option<u32>,
    pub modified: Option<DateTime<Local>>,
    pub accessed: Option<DateTime<Local>>,
    pub created: Option<DateTime<Local>>,
}

impl FileMetadata {
    fn from_std(meta: &std::fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
            readonly: meta.permissions().readonly(),
            mode: permission_mode(meta),
            modified: meta.modified().ok().map(DateTime::from),
            accessed: meta.accessed().ok().map(DateTime::from),
            created: meta.created().ok().map(DateTime::from),
        }
    }

    /// Permission bits rendered as `rwxr-xr-x`
    pub fn permissions_string(&self) -> Option<String> {
        let mode = self.mode?;
        let flags = ['r', 'w', 'x'];
        Some(
            (0..9)
                .map(|i| {
                    if mode & (1 << (8 - i)) != 0 {
                        flags[i % 3]
                    } else {
                        '-'
                    }
                })
                .collect(),
        )
    }
}

#[cfg(unix)]
fn permission_mode(meta: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
const fn permission_mode(_meta: &std::fs::Metadata) -> Option<u32> {
    None
}

/// Write `content` to `path`, replacing any existing file
///
/// Missing parent directories are created.
pub async fn write_static(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<(), FileError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FileError::from_io(parent, e))?;
        }
    }

    fs::write(path, content)
        .await
        .map_err(|e| FileError::from_io(path, e))
}

/// Read metadata for `path`
pub async fn read_status(path: impl AsRef<Path>) -> Result<FileMetadata, FileError> {
    let path = path.as_ref();
    let meta = fs::metadata(path)
        .await
        .map_err(|e| FileError::from_io(path, e))?;
    Ok(FileMetadata::from_std(&meta))
}

/// Serve a single file as a response
///
/// 200 with a Content-Type derived from the extension, 404 when the file
/// is missing (or is a directory), 500 on any other read failure.
pub async fn respond_with_file(path: impl AsRef<Path>) -> Response {
    let path = path.as_ref();

    match fs::read(path).await {
        Ok(content) => Response::new(200)
            .with_header("Content-Type", mime::content_type_for(path))
            .with_body(content),
        Err(e) => match FileError::from_io(path, e) {
            FileError::NotFound(_) => Response::text(404, "404 Not Found"),
            _ if fs::metadata(path).await.is_ok_and(|m| m.is_dir()) => {
                Response::text(404, "404 Not Found")
            }
            err => {
                logger::log_error(&err.to_string());
                Response::internal_error()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("route_server_files_{}_{n}", std::process::id()))
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = scratch_dir();
        let path = dir.join("new.css");

        write_static(&path, "body{color: red}").await.unwrap();
        let content = fs::read(&path).await.unwrap();
        assert_eq!(content, b"body{color: red}");

        // overwriting with the same content leaves the same file
        write_static(&path, "body{color: red}").await.unwrap();
        let meta = read_status(&path).await.unwrap();
        assert_eq!(meta.size, 16);
        assert!(meta.is_file);
        assert!(!meta.is_dir);
        assert!(meta.modified.is_some());

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_status_missing_file() {
        let path = scratch_dir().join("eldohub.jpg");
        let err = read_status(&path).await.unwrap_err();
        assert!(matches!(err, FileError::NotFound(p) if p == path));
    }

    #[tokio::test]
    async fn test_respond_with_file() {
        let dir = scratch_dir();
        let path = dir.join("new.css");
        write_static(&path, "body{color: red}").await.unwrap();

        let resp = respond_with_file(&path).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert_eq!(resp.body().as_ref(), b"body{color: red}");

        let resp = respond_with_file(dir.join("missing.css")).await;
        assert_eq!(resp.status(), 404);

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_beneath_regular_file_is_io_error() {
        let dir = scratch_dir();
        let blocker = dir.join("blocker");
        write_static(&blocker, "not a directory").await.unwrap();

        let err = write_static(blocker.join("new.css"), "body{color: red}")
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::Io { .. }), "got: {err:?}");

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_respond_with_directory_is_404() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).await.unwrap();

        let resp = respond_with_file(&dir).await;
        assert_eq!(resp.status(), 404);

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_respond_with_unreadable_path_is_500() {
        // an interior NUL is rejected by the OS layer with InvalidInput
        let resp = respond_with_file("bad\0name.css").await;
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.body().as_ref(), b"500 Internal Server Error");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_permissions_string() {
        use std::os::unix::fs::PermissionsExt;

        let dir = scratch_dir();
        let path = dir.join("mode.txt");
        write_static(&path, "x").await.unwrap();
        fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640))
            .await
            .unwrap();

        let meta = read_status(&path).await.unwrap();
        assert_eq!(meta.mode, Some(0o640));
        assert_eq!(meta.permissions_string().as_deref(), Some("rw-r-----"));

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_metadata_serializes() {
        let meta = FileMetadata {
            size: 3,
            is_file: true,
            is_dir: false,
            readonly: false,
            mode: Some(0o644),
            modified: None,
            accessed: None,
            created: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["size"], 3);
        assert_eq!(json["mode"], 0o644);
        assert!(json["modified"].is_null());
    }
}
