//! The operations shared by [`App`](crate::App) and [`Scope`](crate::Scope).

use std::path::PathBuf;

use burrow_http::{Handler, Method, StaticConfig};

use crate::error::Result;
use crate::mount::RouteTable;
use crate::scope::Scope;

/// Anything routes can be registered on.
///
/// Registration methods return the receiver so calls chain:
///
/// ```ignore
/// app.get("/", vec![index])?
///     .post("/login", vec![login])?;
/// ```
pub trait Router {
    /// Registers `handlers` for `method` at `path`.
    fn add(&self, method: Method, path: &str, handlers: Vec<Handler>) -> Result<&Self>;

    /// Registers middleware that runs ahead of every route at this
    /// receiver's path, including requests no route matches.
    fn middleware(&self, handlers: Vec<Handler>) -> Result<&Self>;

    /// Like [`middleware`](Self::middleware), limited to `path` and below.
    fn middleware_at(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self>;

    /// Serves files from `root` at `prefix`.
    fn static_dir(
        &self,
        prefix: &str,
        root: impl Into<PathBuf>,
        config: StaticConfig,
    ) -> Result<&Self>;

    /// A scope with the same prefix and `handlers` appended to the middleware.
    fn group(&self, handlers: Vec<Handler>) -> Scope;

    /// A scope below `prefix`, with `handlers` appended to the middleware.
    fn prefix(&self, prefix: &str, handlers: Vec<Handler>) -> Result<Scope>;

    /// Copies every route of `source` below `prefix`.
    ///
    /// The copy is a snapshot: routes added to `source` afterwards do not
    /// show up here. Each copied route runs this receiver's middleware
    /// first, then the source's layers, then its own handlers. Source
    /// layers only wrap copied routes; an unmatched request below the mount
    /// point never reaches them.
    ///
    /// Returns the scope at the mount point. It carries this receiver's
    /// middleware, so routes added through it run that middleware too.
    /// On error nothing is registered.
    fn mount<R: Router>(&self, prefix: &str, source: &R) -> Result<Scope>;

    /// The routes and layers registered so far, for use as a mount source.
    fn route_table(&self) -> Result<RouteTable>;

    /// Registers a GET route.
    fn get(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Get, path, handlers)
    }

    /// Registers a HEAD route.
    fn head(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Head, path, handlers)
    }

    /// Registers a POST route.
    fn post(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Post, path, handlers)
    }

    /// Registers a PUT route.
    fn put(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Put, path, handlers)
    }

    /// Registers a PATCH route.
    fn patch(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Patch, path, handlers)
    }

    /// Registers a DELETE route.
    fn delete(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Delete, path, handlers)
    }

    /// Registers an OPTIONS route.
    fn options(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Options, path, handlers)
    }

    /// Registers a CONNECT route.
    fn connect(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Connect, path, handlers)
    }

    /// Registers a TRACE route.
    fn trace(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.add(Method::Trace, path, handlers)
    }

    /// Registers the same handlers for every method.
    fn all(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        for method in Method::ALL {
            self.add(method, path, handlers.clone())?;
        }
        Ok(self)
    }

    /// Alias for [`all`](Self::all).
    fn any(&self, path: &str, handlers: Vec<Handler>) -> Result<&Self> {
        self.all(path, handlers)
    }
}
