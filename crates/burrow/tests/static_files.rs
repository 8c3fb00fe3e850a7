//! Static directories registered through scopes and mounts.

use std::fs;

use burrow::{handler, App, Method, Request, Response, Router, StaticConfig};
use tempfile::TempDir;

fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("test.txt"), "Hello From File").unwrap();
    fs::write(dir.path().join("index.html"), "Hello from index.html").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs").join("index.html"), "docs").unwrap();
    dir
}

#[tokio::test]
async fn test_static_under_prefix() {
    let dir = public_dir();
    let app = App::new();
    app.prefix("storage", vec![])
        .unwrap()
        .static_dir("/", dir.path(), StaticConfig::default())
        .unwrap();

    let res = app.test(Request::get("/storage/test.txt")).await.unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body_string().as_deref(), Some("Hello From File"));
    assert_eq!(res.get_header("Content-Type"), Some("text/plain; charset=utf-8"));
}

#[tokio::test]
async fn test_static_under_nested_prefix_serves_index() {
    let dir = public_dir();
    let app = App::new();
    app.prefix("storage", vec![])
        .unwrap()
        .prefix("v1", vec![])
        .unwrap()
        .static_dir("/", dir.path(), StaticConfig::default())
        .unwrap();

    for path in ["/storage/v1", "/storage/v1/", "/storage/v1/index.html"] {
        let res = app.test(Request::get(path)).await.unwrap();
        assert_eq!(res.status, 200, "{path}");
        assert_eq!(res.body_string().as_deref(), Some("Hello from index.html"), "{path}");
    }

    let res = app.test(Request::get("/storage/v1/docs")).await.unwrap();
    assert_eq!(res.body_string().as_deref(), Some("docs"));
}

#[tokio::test]
async fn test_missing_file_falls_through() {
    let dir = public_dir();
    let app = App::new();
    app.static_dir("/assets", dir.path(), StaticConfig::default())
        .unwrap();

    let res = app.test(Request::get("/assets/nope.txt")).await.unwrap();
    assert_eq!(res.status, 404);

    let res = app.test(Request::get("/assets/../secret")).await.unwrap();
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_static_route_owns_its_prefix() {
    let dir = public_dir();
    let app = App::new();
    app.static_dir("/assets", dir.path(), StaticConfig::default())
        .unwrap();
    app.get(
        "/assets/{*rest}",
        vec![handler(|_ctx| async { Ok(Response::text("fallback")) })],
    )
    .unwrap();

    // First match wins: the later route is never consulted.
    let res = app.test(Request::get("/assets/nope.txt")).await.unwrap();
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_scope_middleware_wraps_static_files() {
    let dir = public_dir();
    let app = App::new();
    app.group(vec![handler(|ctx| async move {
        let res = ctx.next().await?;
        Ok(res.header("X-Static", "yes"))
    })])
    .static_dir("/files", dir.path(), StaticConfig::default())
    .unwrap();

    let res = app.test(Request::get("/files/test.txt")).await.unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("X-Static"), Some("yes"));
}

#[tokio::test]
async fn test_static_routes_survive_mounting() {
    let dir = public_dir();
    let cdn = App::new();
    cdn.static_dir("/assets", dir.path(), StaticConfig::default())
        .unwrap();

    let app = App::new();
    app.mount("cdn", &cdn).unwrap();

    let res = app.test(Request::get("/cdn/assets/test.txt")).await.unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body_string().as_deref(), Some("Hello From File"));
}

#[tokio::test]
async fn test_static_config_headers() {
    let dir = public_dir();
    let app = App::new();
    let config = StaticConfig {
        max_age: 60,
        download: true,
        ..StaticConfig::default()
    };
    app.static_dir("/dl", dir.path(), config).unwrap();

    let res = app.test(Request::get("/dl/test.txt")).await.unwrap();
    assert_eq!(res.get_header("Cache-Control"), Some("public, max-age=60"));
    assert_eq!(
        res.get_header("Content-Disposition"),
        Some("attachment; filename=\"test.txt\"")
    );
}

#[tokio::test]
async fn test_head_on_static_file_has_no_body() {
    let dir = public_dir();
    let app = App::new();
    app.static_dir("/", dir.path(), StaticConfig::default())
        .unwrap();

    let res = app.test(Request::new(Method::Head, "/test.txt")).await.unwrap();
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());
}

#[tokio::test]
async fn test_single_file_root() {
    let dir = public_dir();
    let app = App::new();
    app.static_dir("/readme", dir.path().join("test.txt"), StaticConfig::default())
        .unwrap();

    for path in ["/readme", "/readme/anything"] {
        let res = app.test(Request::get(path)).await.unwrap();
        assert_eq!(res.body_string().as_deref(), Some("Hello From File"), "{path}");
    }
}
