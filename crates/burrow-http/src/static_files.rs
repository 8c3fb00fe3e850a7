//! Static file serving.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::handler::{handler, Handler};
use crate::response::Response;

/// Name of the wildcard parameter static routes capture the file path in.
pub const FILE_PARAM: &str = "filepath";

/// Options for a static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// File served when a directory is requested.
    pub index: String,
    /// `Cache-Control: max-age` in seconds. Zero sends no header.
    pub max_age: u32,
    /// Send files as attachments.
    pub download: bool,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            index: "index.html".to_string(),
            max_age: 0,
            download: false,
        }
    }
}

/// Builds the handler that serves files below `root`.
///
/// The requested file comes from the [`FILE_PARAM`] path parameter. If
/// `root` is a file it is served for every request. A missing file hands
/// the request to the next handler in the chain.
pub fn static_handler(root: impl Into<PathBuf>, config: StaticConfig) -> Handler {
    let root = Arc::new(root.into());
    let config = Arc::new(config);

    handler(move |ctx| {
        let root = Arc::clone(&root);
        let config = Arc::clone(&config);
        async move {
            let requested = ctx.param(FILE_PARAM).unwrap_or_default().to_string();
            let Some(file) = locate(&root, &requested, &config.index).await else {
                return ctx.next().await;
            };
            let Ok(bytes) = tokio::fs::read(&file).await else {
                return ctx.next().await;
            };

            let mut res = Response::ok()
                .content_type(content_type_for(&file))
                .body(bytes);
            if config.max_age > 0 {
                res = res.header("Cache-Control", format!("public, max-age={}", config.max_age));
            }
            if config.download {
                if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                    res = res.header(
                        "Content-Disposition",
                        format!("attachment; filename=\"{name}\""),
                    );
                }
            }
            Ok(res)
        }
    })
}

/// Resolves a request path to a file on disk, refusing to leave `root`,
/// whether through `..` or a symlink pointing elsewhere.
async fn locate(root: &Path, requested: &str, index: &str) -> Option<PathBuf> {
    let found = find_file(root, requested, index).await?;
    let real_root = tokio::fs::canonicalize(root).await.ok()?;
    let real = tokio::fs::canonicalize(&found).await.ok()?;
    real.starts_with(&real_root).then_some(found)
}

async fn find_file(root: &Path, requested: &str, index: &str) -> Option<PathBuf> {
    let root_meta = tokio::fs::metadata(root).await.ok()?;
    if root_meta.is_file() {
        return Some(root.to_path_buf());
    }

    let mut path = root.to_path_buf();
    for component in Path::new(requested.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    let meta = tokio::fs::metadata(&path).await.ok()?;
    if meta.is_dir() {
        path.push(index);
        let index_meta = tokio::fs::metadata(&path).await.ok()?;
        return index_meta.is_file().then_some(path);
    }
    meta.is_file().then_some(path)
}

/// Guesses a content type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "woff2" => "font/woff2",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}
