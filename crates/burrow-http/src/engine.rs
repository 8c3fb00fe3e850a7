//! The engine: route table, middleware layers and request dispatch.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{EngineError, HttpError, Result};
use crate::handler::{cannot, handler, Ctx, Handler};
use crate::method::Method;
use crate::path::{has_path_prefix, PathPattern};
use crate::request::{PathParams, Request};
use crate::response::Response;
use crate::server::{ServerState, ShutdownHandle};
use crate::static_files::{static_handler, StaticConfig, FILE_PARAM};

/// Turns a handler error into the response sent to the client.
pub type ErrorHandler = Arc<dyn Fn(HttpError) -> Response + Send + Sync>;

/// A single registered route.
#[derive(Clone)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Path exactly as registered.
    pub path: String,
    /// Compiled path pattern.
    pattern: PathPattern,
    /// Handler chain, run in order.
    pub handlers: Vec<Handler>,
}

impl Route {
    /// The compiled pattern for this route.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Middleware registered with `use`: runs ahead of every route at or below
/// `path`, including requests no route matches.
#[derive(Clone)]
pub struct Layer {
    /// Path prefix the layer guards; `/` guards everything.
    pub path: String,
    /// Handlers, run in order.
    pub handlers: Vec<Handler>,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// The HTTP engine.
///
/// Routes are matched in registration order; the first route whose pattern
/// and method both match wins. A HEAD request falls back to a GET route.
pub struct Engine {
    config: Config,
    routes: RwLock<Vec<Route>>,
    layers: RwLock<Vec<Layer>>,
    error_handler: RwLock<ErrorHandler>,
    server: Arc<ServerState>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    /// Creates an engine with no routes.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: RwLock::new(Vec::new()),
            layers: RwLock::new(Vec::new()),
            error_handler: RwLock::new(Arc::new(default_error_handler)),
            server: Arc::new(ServerState::default()),
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a route.
    ///
    /// A path without a leading `/` gets one.
    pub fn add_route(&self, method: Method, path: &str, handlers: Vec<Handler>) -> Result<()> {
        let route = self.compile_route(method, path, handlers)?;
        write(&self.routes).push(route);
        Ok(())
    }

    /// Registers several routes at once.
    ///
    /// Every route is compiled before any is added, so on error the table
    /// is left exactly as it was.
    pub fn add_routes<I>(&self, routes: I) -> Result<()>
    where
        I: IntoIterator<Item = (Method, String, Vec<Handler>)>,
    {
        let compiled = routes
            .into_iter()
            .map(|(method, path, handlers)| self.compile_route(method, &path, handlers))
            .collect::<Result<Vec<_>>>()?;
        write(&self.routes).extend(compiled);
        Ok(())
    }

    fn compile_route(&self, method: Method, path: &str, handlers: Vec<Handler>) -> Result<Route> {
        let path = rooted(path);
        if handlers.is_empty() {
            return Err(EngineError::MissingHandler {
                method,
                path: path.into_owned(),
            });
        }
        let pattern = PathPattern::new(&path, self.config.match_options())?;

        debug!(%method, path = %path, handlers = handlers.len(), "route registered");
        Ok(Route {
            method,
            path: path.into_owned(),
            pattern,
            handlers,
        })
    }

    /// Registers a middleware layer guarding `path` and everything below it.
    pub fn add_layer(&self, path: &str, handlers: Vec<Handler>) -> Result<()> {
        let path = rooted(path);
        if handlers.is_empty() {
            return Ok(());
        }

        debug!(path = %path, handlers = handlers.len(), "layer registered");
        write(&self.layers).push(Layer {
            path: path.into_owned(),
            handlers,
        });
        Ok(())
    }

    /// Registers GET and HEAD routes serving files from `root` at `prefix`.
    ///
    /// `middleware` runs ahead of the file handler.
    pub fn add_static(
        &self,
        prefix: &str,
        root: impl Into<PathBuf>,
        config: StaticConfig,
        middleware: Vec<Handler>,
    ) -> Result<()> {
        let prefix = rooted(prefix);
        let wildcard = format!("{}/{{*{FILE_PARAM}}}", prefix.trim_end_matches('/'));

        let mut chain = middleware;
        chain.push(static_handler(root, config));

        for method in [Method::Get, Method::Head] {
            self.add_route(method, &prefix, chain.clone())?;
            self.add_route(method, &wildcard, chain.clone())?;
        }
        Ok(())
    }

    /// Snapshot of the route table, in registration order.
    pub fn routes(&self) -> Vec<Route> {
        read(&self.routes).clone()
    }

    /// Snapshot of the middleware layers, in registration order.
    pub fn layers(&self) -> Vec<Layer> {
        read(&self.layers).clone()
    }

    /// Total number of handlers across routes and layers.
    pub fn handlers_count(&self) -> usize {
        let routes: usize = read(&self.routes).iter().map(|r| r.handlers.len()).sum();
        let layers: usize = read(&self.layers).iter().map(|l| l.handlers.len()).sum();
        routes + layers
    }

    /// Replaces the handler that renders handler errors.
    pub fn set_error_handler<F>(&self, f: F)
    where
        F: Fn(HttpError) -> Response + Send + Sync + 'static,
    {
        *write(&self.error_handler) = Arc::new(f);
    }

    /// A handle that can stop this engine's server from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(Arc::clone(&self.server))
    }

    pub(crate) fn server_state(&self) -> Arc<ServerState> {
        Arc::clone(&self.server)
    }

    /// Dispatches a request through the matching handler chain.
    pub async fn handle(&self, request: Request) -> Response {
        let head = request.method == Method::Head;
        let (chain, params) = self.resolve(&request);

        let result = Ctx::new(request, params, chain.into()).run().await;
        let mut response = match result {
            Ok(res) => res,
            Err(err) => {
                let error_handler = Arc::clone(&read(&self.error_handler));
                error_handler(err)
            }
        };

        if head {
            response.body.clear();
        }
        if let Some(server) = &self.config.server_header {
            response = response.header("Server", server.as_str());
        }
        response
    }

    /// Like [`handle`](Self::handle), but gives up after `timeout`.
    pub async fn test(&self, request: Request, timeout: Duration) -> Result<Response> {
        tokio::time::timeout(timeout, self.handle(request))
            .await
            .map_err(|_| EngineError::Timeout(timeout))
    }

    /// Builds the chain for a request: matching layers, then the route's
    /// handlers or a terminal 404/405.
    fn resolve(&self, request: &Request) -> (Vec<Handler>, PathParams) {
        let case_sensitive = self.config.case_sensitive;
        let mut chain: Vec<Handler> = read(&self.layers)
            .iter()
            .filter(|layer| has_path_prefix(&request.path, &layer.path, case_sensitive))
            .flat_map(|layer| layer.handlers.iter().cloned())
            .collect();

        match self.find_route(request) {
            Ok((handlers, params)) => {
                chain.extend(handlers);
                (chain, params)
            }
            Err(status) => {
                chain.push(terminal(status));
                (chain, PathParams::new())
            }
        }
    }

    /// Finds the route for a request, or the status to answer with.
    fn find_route(&self, request: &Request) -> std::result::Result<(Vec<Handler>, PathParams), u16> {
        let routes = read(&self.routes);
        let mut method_matched = false;
        let mut get_fallback = None;

        for route in routes.iter() {
            if let Some(params) = route.pattern.match_path(&request.path) {
                method_matched = true;
                if route.method == request.method {
                    return Ok((route.handlers.clone(), params));
                }
                if request.method == Method::Head
                    && route.method == Method::Get
                    && get_fallback.is_none()
                {
                    get_fallback = Some((route.handlers.clone(), params));
                }
            }
        }

        match get_fallback {
            Some(found) => Ok(found),
            None if method_matched => Err(405),
            None => Err(404),
        }
    }
}

fn terminal(status: u16) -> Handler {
    handler(move |ctx| async move {
        if status == 405 {
            Err(HttpError::new(405, "Method Not Allowed"))
        } else {
            Err(cannot(ctx.method(), ctx.path()))
        }
    })
}

fn default_error_handler(err: HttpError) -> Response {
    Response::new(err.status)
        .content_type("text/plain; charset=utf-8")
        .body(err.message)
}

fn rooted(path: &str) -> std::borrow::Cow<'_, str> {
    if path.starts_with('/') || path == "*" {
        path.into()
    } else {
        format!("/{path}").into()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
