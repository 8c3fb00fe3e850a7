//! Mounting one app's routes into another app's namespace.

use std::sync::{Arc, Mutex};

use burrow::{handler, App, EngineError, Handler, Method, Request, Response, RouteError, Router};

fn text(body: &'static str) -> Handler {
    handler(move |_ctx| async move { Ok(Response::text(body)) })
}

fn recording(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Handler {
    let log = Arc::clone(log);
    handler(move |ctx| {
        log.lock().unwrap().push(name);
        ctx.next()
    })
}

fn version_header() -> Handler {
    handler(|ctx| async move {
        let res = ctx.next().await?;
        Ok(res.header("X-Api-Version", "1.0.0"))
    })
}

async fn body(app: &App, path: &str) -> (u16, String) {
    let res = app.test(Request::get(path)).await.unwrap();
    (res.status, res.body_string().unwrap_or_default())
}

#[tokio::test]
async fn test_mount_at_app_root() {
    let islands = App::new();
    islands.get("/", vec![text("Island Index")]).unwrap();

    let app = App::new();
    app.mount("islands", &islands).unwrap();

    assert_eq!(body(&app, "/islands/").await, (200, "Island Index".to_string()));
    assert_eq!(body(&app, "/islands").await, (200, "Island Index".to_string()));
}

#[tokio::test]
async fn test_mount_copies_a_snapshot() {
    let source = App::new();
    source.get("/hell", vec![text("Why??")]).unwrap();

    let app = App::new();
    let api = app.group(vec![version_header()]);
    api.mount("v1", &source).unwrap();

    source.get("/late", vec![text("too late")]).unwrap();

    let res = app.test(Request::get("/v1/hell")).await.unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body_string().as_deref(), Some("Why??"));
    assert_eq!(res.get_header("X-Api-Version"), Some("1.0.0"));

    assert_eq!(body(&app, "/v1/late").await.0, 404);
    assert_eq!(body(&source, "/late").await, (200, "too late".to_string()));
}

#[tokio::test]
async fn test_mount_returns_scope_at_mount_point() {
    let micro = App::new();
    micro.get("/doe", vec![text("Hello")]).unwrap();

    let app = App::new();
    let john = app.mount("john", &micro).unwrap();
    assert_eq!(john.path_prefix(), Some("/john"));

    john.get("/x", vec![text("x")]).unwrap();
    john.prefix("v1", vec![])
        .unwrap()
        .get("y", vec![text("y")])
        .unwrap();

    assert_eq!(body(&app, "/john/doe").await, (200, "Hello".to_string()));
    assert_eq!(body(&app, "/john/x").await, (200, "x".to_string()));
    assert_eq!(body(&app, "/john/v1/y").await, (200, "y".to_string()));
}

#[tokio::test]
async fn test_mount_under_prefixed_scope() {
    let source = App::new();
    source.post("/items", vec![text("created")]).unwrap();

    let app = App::new();
    app.prefix("api", vec![])
        .unwrap()
        .mount("/v2/", &source)
        .unwrap();

    let routes = app.routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].method, Method::Post);
    assert_eq!(routes[0].path, "/api/v2/items");

    let res = app.test(Request::post("/api/v2/items")).await.unwrap();
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_caller_middleware_runs_before_source_handlers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let source = App::new();
    source
        .group(vec![recording(&log, "source-mw")])
        .get("/h", vec![recording(&log, "h"), text("done")])
        .unwrap();

    let app = App::new();
    app.group(vec![recording(&log, "outer")])
        .mount("m", &source)
        .unwrap();

    assert_eq!(body(&app, "/m/h").await, (200, "done".to_string()));
    assert_eq!(*log.lock().unwrap(), vec!["outer", "source-mw", "h"]);
}

#[tokio::test]
async fn test_source_layers_are_carried_under_the_mount_point() {
    let micro = App::new();
    micro.middleware(vec![version_header()]).unwrap();
    micro.get("/doe", vec![text("Hello")]).unwrap();

    let app = App::new();
    app.mount("john", &micro).unwrap();
    app.get("/other", vec![text("other")]).unwrap();

    let res = app.test(Request::get("/john/doe")).await.unwrap();
    assert_eq!(res.get_header("X-Api-Version"), Some("1.0.0"));

    let res = app.test(Request::get("/other")).await.unwrap();
    assert_eq!(res.get_header("X-Api-Version"), None);
}

#[tokio::test]
async fn test_caller_middleware_runs_before_source_layers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let source = App::new();
    source.middleware(vec![recording(&log, "source-layer")]).unwrap();
    source.get("/h", vec![recording(&log, "h"), text("done")]).unwrap();

    let app = App::new();
    app.group(vec![recording(&log, "caller-mw")])
        .mount("m", &source)
        .unwrap();

    assert_eq!(body(&app, "/m/h").await, (200, "done".to_string()));
    assert_eq!(*log.lock().unwrap(), vec!["caller-mw", "source-layer", "h"]);
}

#[tokio::test]
async fn test_source_layer_cannot_skip_caller_auth() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let source = App::new();
    source
        .middleware(vec![handler(|_ctx| async {
            Ok(Response::text("from source layer"))
        })])
        .unwrap();
    source.get("/h", vec![text("h")]).unwrap();

    let auth_log = Arc::clone(&log);
    let auth = handler(move |_ctx| {
        auth_log.lock().unwrap().push("auth");
        async { Ok(Response::status_only(401)) }
    });

    let app = App::new();
    app.group(vec![auth]).mount("m", &source).unwrap();

    assert_eq!(body(&app, "/m/h").await, (401, "Unauthorized".to_string()));
    assert_eq!(*log.lock().unwrap(), vec!["auth"]);
}

#[tokio::test]
async fn test_path_scoped_source_layer_follows_captured_paths() {
    let source = App::new();
    source
        .middleware_at(
            "/admin",
            vec![handler(|ctx| async move {
                let res = ctx.next().await?;
                Ok(res.header("X-Admin", "yes"))
            })],
        )
        .unwrap();
    source.get("/{*rest}", vec![text("page")]).unwrap();

    let app = App::new();
    app.mount("m", &source).unwrap();

    let res = app.test(Request::get("/m/admin/users")).await.unwrap();
    assert_eq!(res.body_string().as_deref(), Some("page"));
    assert_eq!(res.get_header("X-Admin"), Some("yes"));

    let res = app.test(Request::get("/m/public")).await.unwrap();
    assert_eq!(res.body_string().as_deref(), Some("page"));
    assert_eq!(res.get_header("X-Admin"), None);
}

#[tokio::test]
async fn test_source_catch_all_covers_the_mount_root() {
    let source = App::new();
    source.all("*", vec![text("catch")]).unwrap();
    assert_eq!(body(&source, "/").await, (200, "catch".to_string()));

    let app = App::new();
    app.mount("v1", &source).unwrap();

    for path in ["/v1", "/v1/", "/v1/x", "/v1/x/y"] {
        assert_eq!(body(&app, path).await, (200, "catch".to_string()), "{path}");
    }
    assert_eq!(body(&app, "/v10").await.0, 404);
}

#[tokio::test]
async fn test_returned_scope_keeps_caller_middleware() {
    let source = App::new();
    source.get("/doe", vec![text("doe")]).unwrap();

    let app = App::new();
    let john = app.group(vec![version_header()]).mount("john", &source).unwrap();
    john.get("/extra", vec![text("extra")]).unwrap();

    let res = app.test(Request::get("/john/extra")).await.unwrap();
    assert_eq!(res.body_string().as_deref(), Some("extra"));
    assert_eq!(res.get_header("X-Api-Version"), Some("1.0.0"));
}

#[test]
fn test_failed_mount_registers_nothing() {
    let source = App::new();
    source.middleware(vec![version_header()]).unwrap();
    source.get("/a", vec![text("a")]).unwrap();
    source.get("/b", vec![text("b")]).unwrap();

    let app = App::new();
    assert!(matches!(
        app.mount("/:", &source),
        Err(RouteError::Engine(EngineError::InvalidPattern(_)))
    ));
    assert!(app.routes().is_empty());
    assert!(app.engine().layers().is_empty());
}

#[tokio::test]
async fn test_mount_an_app_into_itself() {
    let app = App::new();
    app.get("/a", vec![text("a")]).unwrap();
    app.mount("copy", &app).unwrap();

    assert_eq!(app.routes().len(), 2);
    assert_eq!(body(&app, "/a").await, (200, "a".to_string()));
    assert_eq!(body(&app, "/copy/a").await, (200, "a".to_string()));
}

#[test]
fn test_scope_is_not_a_mount_source() {
    let app = App::new();
    let source = app.prefix("/src", vec![]).unwrap();
    source.get("/x", vec![text("x")]).unwrap();

    let other = App::new();
    assert!(matches!(
        other.mount("v1", &source),
        Err(RouteError::Unsupported(_))
    ));
    assert!(other.routes().is_empty());
}

#[test]
fn test_mount_rejects_empty_prefix() {
    let source = App::new();
    source.get("/x", vec![text("x")]).unwrap();

    let app = App::new();
    assert!(matches!(app.mount("", &source), Err(RouteError::EmptyPrefix)));
    assert!(app.routes().is_empty());
}
