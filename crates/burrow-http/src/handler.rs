//! Handler chains and the per-request context.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::HttpError;
use crate::method::Method;
use crate::request::{PathParams, Request};
use crate::response::Response;

/// What a handler produces: a response, or an error for the engine's error
/// handler to render.
pub type HandlerResult = Result<Response, HttpError>;

/// A boxed async handler function.
///
/// Handlers form chains. Middleware is just a handler that either answers
/// directly (short-circuit) or calls [`Ctx::next`] to run the rest of the
/// chain.
pub type Handler = Arc<dyn Fn(Ctx) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wraps an async function or closure into a [`Handler`].
///
/// # Example
///
/// ```
/// use burrow_http::{handler, Response};
///
/// let hello = handler(|_ctx| async { Ok(Response::text("Hello, World!")) });
/// let version = handler(|ctx| async move {
///     let res = ctx.next().await?;
///     Ok(res.header("X-Api-Version", "1.0.0"))
/// });
/// # let _ = (hello, version);
/// ```
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Ctx| -> BoxFuture<'static, HandlerResult> { Box::pin(f(ctx)) })
}

/// Per-request context handed down a handler chain.
pub struct Ctx {
    request: Request,
    params: PathParams,
    locals: HashMap<String, String>,
    chain: Arc<[Handler]>,
    index: usize,
}

impl Ctx {
    pub(crate) fn new(request: Request, params: PathParams, chain: Arc<[Handler]>) -> Self {
        Self {
            request,
            params,
            locals: HashMap::new(),
            chain,
            index: 0,
        }
    }

    /// The request being handled.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the request, for middleware that rewrites it.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.request.method
    }

    /// The request path.
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Parameters captured by the matched route pattern.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// A single captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// A query string parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.query_value(key)
    }

    /// A request header, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.request.header_value(key)
    }

    /// Stores a value for handlers further down the chain.
    pub fn set_local(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.locals.insert(key.into(), value.into());
    }

    /// Reads a value stored by an earlier handler.
    pub fn local(&self, key: &str) -> Option<&str> {
        self.locals.get(key).map(String::as_str)
    }

    /// Position of the running handler in the chain.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Runs the rest of the chain.
    ///
    /// Past the last handler this resolves to a 404 error, the same answer
    /// an unmatched request gets.
    pub fn next(mut self) -> BoxFuture<'static, HandlerResult> {
        self.index += 1;
        self.run()
    }

    pub(crate) fn run(self) -> BoxFuture<'static, HandlerResult> {
        match self.chain.get(self.index).cloned() {
            Some(current) => current(self),
            None => {
                let err = cannot(self.method(), self.path());
                Box::pin(async move { Err(err) })
            }
        }
    }
}

impl std::fmt::Debug for Ctx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ctx")
            .field("request", &self.request)
            .field("params", &self.params)
            .field("locals", &self.locals)
            .field("chain_len", &self.chain.len())
            .field("index", &self.index)
            .finish()
    }
}

/// The error for a request nothing answered.
pub(crate) fn cannot(method: Method, path: &str) -> HttpError {
    HttpError::not_found(format!("Cannot {method} {path}"))
}
