//! Scopes: prefix and middleware composition.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use burrow_http::{Engine, Handler, Method, StaticConfig};

use crate::error::{Result, RouteError};
use crate::mount::{self, RouteTable};
use crate::router::Router;

/// An immutable view of an [`App`](crate::App) with a path prefix and a
/// middleware chain.
///
/// Both are fully resolved when the scope is created: a scope made from
/// another scope already holds its parent's prefix and middleware, so a
/// registration never walks back up the tree. `group` and `prefix` return
/// new scopes and never touch the receiver.
///
/// The link to the app is weak. Once the app is dropped, registering
/// through a scope fails with [`RouteError::Detached`].
#[derive(Clone)]
pub struct Scope {
    prefix: Option<String>,
    middleware: Vec<Handler>,
    engine: Weak<Engine>,
}

impl Scope {
    pub(crate) fn new(engine: Weak<Engine>, prefix: Option<String>, middleware: Vec<Handler>) -> Self {
        Self {
            prefix,
            middleware,
            engine,
        }
    }

    /// The resolved prefix, if any scope on the way down set one.
    pub fn path_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The resolved middleware chain prepended to every route.
    pub fn chain(&self) -> &[Handler] {
        &self.middleware
    }

    /// The full path a route registered at `path` ends up at.
    pub fn resolve(&self, path: &str) -> Result<String> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        Ok(match &self.prefix {
            Some(prefix) => join(prefix, path),
            None => path.to_string(),
        })
    }

    /// Composes `prefix` below this scope's own prefix.
    pub(crate) fn compose_prefix(&self, prefix: &str) -> Result<String> {
        if prefix.is_empty() {
            return Err(RouteError::EmptyPrefix);
        }
        match &self.prefix {
            Some(own) => Ok(join(own, prefix)),
            None => normalize_prefix(prefix),
        }
    }

    /// This scope's middleware followed by `handlers`.
    pub(crate) fn with_middleware(&self, handlers: Vec<Handler>) -> Vec<Handler> {
        let mut chain = Vec::with_capacity(self.middleware.len() + handlers.len());
        chain.extend(self.middleware.iter().cloned());
        chain.extend(handlers);
        chain
    }

    pub(crate) fn engine_ref(&self) -> Weak<Engine> {
        Weak::clone(&self.engine)
    }

    pub(crate) fn engine(&self) -> Result<Arc<Engine>> {
        self.engine.upgrade().ok_or(RouteError::Detached)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl Router for Scope {
    fn add(&self, method: Method, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        let path = self.resolve(path)?;
        self.engine()?
            .add_route(method, &path, self.with_middleware(handlers))?;
        Ok(self)
    }

    fn middleware(&self, handlers: Vec<Handler>) -> Result<&Self> {
        let path = self.prefix.as_deref().unwrap_or("/");
        self.engine()?.add_layer(path, handlers)?;
        Ok(self)
    }

    fn middleware_at(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        let path = self.resolve(path)?;
        self.engine()?.add_layer(&path, handlers)?;
        Ok(self)
    }

    fn static_dir(
        &self,
        prefix: &str,
        root: impl Into<PathBuf>,
        config: StaticConfig,
    ) -> Result<&Self> {
        let prefix = self.resolve(prefix)?;
        self.engine()?
            .add_static(&prefix, root, config, self.middleware.clone())?;
        Ok(self)
    }

    fn group(&self, handlers: Vec<Handler>) -> Scope {
        Self::new(
            self.engine_ref(),
            self.prefix.clone(),
            self.with_middleware(handlers),
        )
    }

    fn prefix(&self, prefix: &str, handlers: Vec<Handler>) -> Result<Scope> {
        Ok(Self::new(
            self.engine_ref(),
            Some(self.compose_prefix(prefix)?),
            self.with_middleware(handlers),
        ))
    }

    fn mount<R: Router>(&self, prefix: &str, source: &R) -> Result<Scope> {
        mount::mount(self, prefix, source)
    }

    fn route_table(&self) -> Result<RouteTable> {
        Err(RouteError::Unsupported(
            "a scope has no route table of its own; mount an App instead",
        ))
    }
}

/// Prepends `/` to a prefix that lacks one.
pub(crate) fn normalize_prefix(prefix: &str) -> Result<String> {
    if prefix.is_empty() {
        return Err(RouteError::EmptyPrefix);
    }
    Ok(if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    })
}

/// Joins a prefix and a path with exactly one `/` between them.
pub(crate) fn join(prefix: &str, path: &str) -> String {
    match (prefix.ends_with('/'), path.strip_prefix('/')) {
        (true, Some(rest)) => format!("{prefix}{rest}"),
        (false, None) => format!("{prefix}/{path}"),
        _ => format!("{prefix}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("v1").unwrap(), "/v1");
        assert_eq!(normalize_prefix("/v1").unwrap(), "/v1");
        assert!(matches!(normalize_prefix(""), Err(RouteError::EmptyPrefix)));
    }

    #[test]
    fn test_join_inserts_missing_separator() {
        assert_eq!(join("/v1", "hello"), "/v1/hello");
    }

    #[test]
    fn test_join_keeps_single_separator() {
        assert_eq!(join("/v1", "/hello"), "/v1/hello");
        assert_eq!(join("/v1/", "hello"), "/v1/hello");
        assert_eq!(join("/v1/", "/hello"), "/v1/hello");
        assert_eq!(join("/", "/"), "/");
    }

    #[test]
    fn test_scope_without_prefix_passes_paths_through() {
        let scope = Scope::new(Weak::new(), None, Vec::new());
        assert_eq!(scope.resolve("/hello").unwrap(), "/hello");
        assert_eq!(scope.resolve("hello").unwrap(), "hello");
        assert!(matches!(scope.resolve(""), Err(RouteError::EmptyPath)));
    }

    #[test]
    fn test_nested_prefixes_compose() {
        let v1 = Scope::new(Weak::new(), Some("/v1".to_string()), Vec::new());
        let hello = v1.prefix("hello", Vec::new()).unwrap();
        assert_eq!(hello.path_prefix(), Some("/v1/hello"));
        assert_eq!(hello.resolve("/x").unwrap(), "/v1/hello/x");
        assert_eq!(hello.resolve("x").unwrap(), "/v1/hello/x");
    }

    #[test]
    fn test_group_then_prefix_normalizes() {
        let group = Scope::new(Weak::new(), None, Vec::new());
        let v1 = group.prefix("v1", Vec::new()).unwrap();
        assert_eq!(v1.path_prefix(), Some("/v1"));
    }

    #[test]
    fn test_detached_scope() {
        let scope = Scope::new(Weak::new(), None, Vec::new());
        let h = burrow_http::handler(|_ctx| async { Ok(burrow_http::Response::ok()) });
        assert!(matches!(
            scope.get("/", vec![h]),
            Err(RouteError::Detached)
        ));
    }

    #[test]
    fn test_scope_is_not_a_mount_source() {
        let scope = Scope::new(Weak::new(), None, Vec::new());
        assert!(matches!(
            scope.route_table(),
            Err(RouteError::Unsupported(_))
        ));
    }
}
