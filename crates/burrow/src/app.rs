//! The app: owner of the engine and root of every scope.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use burrow_http::{
    Config, Engine, Handler, HttpError, Method, Request, Response, Route, ShutdownHandle,
    StaticConfig,
};
use tokio::net::TcpListener;

use crate::error::{Result, RouteError};
use crate::mount::RouteTable;
use crate::router::Router;
use crate::scope::{normalize_prefix, Scope};

/// How long [`App::test`] waits for a response.
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(1);

/// The route registry.
///
/// Owns the engine. Every [`Scope`] derived from an app registers into that
/// engine, and only the app serves traffic.
pub struct App {
    engine: Arc<Engine>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an app with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an app with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            engine: Arc::new(Engine::new(config)),
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &Config {
        self.engine.config()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Snapshot of the registered routes, in registration order.
    pub fn routes(&self) -> Vec<Route> {
        self.engine.routes()
    }

    /// Total number of registered handlers.
    pub fn handlers_count(&self) -> usize {
        self.engine.handlers_count()
    }

    /// Replaces the handler that renders handler errors.
    pub fn set_error_handler<F>(&self, f: F)
    where
        F: Fn(HttpError) -> Response + Send + Sync + 'static,
    {
        self.engine.set_error_handler(f);
    }

    /// Runs one request through the app without a socket.
    pub async fn test(&self, request: Request) -> burrow_http::Result<Response> {
        self.test_timeout(request, DEFAULT_TEST_TIMEOUT).await
    }

    /// Like [`test`](Self::test), with a custom timeout.
    pub async fn test_timeout(
        &self,
        request: Request,
        timeout: Duration,
    ) -> burrow_http::Result<Response> {
        self.engine.test(request, timeout).await
    }

    /// Binds `addr` and serves until [`shutdown`](Self::shutdown).
    pub async fn listen(&self, addr: &str) -> burrow_http::Result<()> {
        burrow_http::listen(Arc::clone(&self.engine), addr).await
    }

    /// Serves an already bound listener until shut down.
    pub async fn serve(&self, listener: TcpListener) -> burrow_http::Result<()> {
        burrow_http::serve(Arc::clone(&self.engine), listener).await
    }

    /// Stops serving and waits for open connections to finish.
    pub async fn shutdown(&self) -> burrow_http::Result<()> {
        self.shutdown_handle().shutdown().await
    }

    /// A handle that can stop the server from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.engine.shutdown_handle()
    }

    /// The bound address while serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.shutdown_handle().local_addr()
    }

    fn scope(&self, prefix: Option<String>, middleware: Vec<Handler>) -> Scope {
        Scope::new(Arc::downgrade(&self.engine), prefix, middleware)
    }
}

impl Router for App {
    fn add(&self, method: Method, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        self.engine.add_route(method, path, handlers)?;
        Ok(self)
    }

    fn middleware(&self, handlers: Vec<Handler>) -> Result<&Self> {
        self.engine.add_layer("/", handlers)?;
        Ok(self)
    }

    fn middleware_at(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        self.engine.add_layer(path, handlers)?;
        Ok(self)
    }

    fn static_dir(
        &self,
        prefix: &str,
        root: impl Into<PathBuf>,
        config: StaticConfig,
    ) -> Result<&Self> {
        if prefix.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        self.engine.add_static(prefix, root, config, Vec::new())?;
        Ok(self)
    }

    fn group(&self, handlers: Vec<Handler>) -> Scope {
        self.scope(None, handlers)
    }

    fn prefix(&self, prefix: &str, handlers: Vec<Handler>) -> Result<Scope> {
        Ok(self.scope(Some(normalize_prefix(prefix)?), handlers))
    }

    fn mount<R: Router>(&self, prefix: &str, source: &R) -> Result<Scope> {
        self.group(Vec::new()).mount(prefix, source)
    }

    fn route_table(&self) -> Result<RouteTable> {
        Ok(RouteTable {
            routes: self.engine.routes(),
            layers: self.engine.layers(),
        })
    }
}
