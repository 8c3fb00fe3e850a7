//! Mounting: re-hosting one app's routes under another scope.

use std::sync::Arc;

use burrow_http::{handler, has_path_prefix, Handler, Layer, Route};
use tracing::debug;

use crate::error::{Result, RouteError};
use crate::router::Router;
use crate::scope::{join, Scope};

/// Everything a mount copies out of its source.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Routes in registration order.
    pub routes: Vec<Route>,
    /// Middleware layers in registration order.
    pub layers: Vec<Layer>,
}

/// Copies the routes of `source` into `caller`'s namespace below `prefix`.
///
/// Each copied route keeps its method and its path below the mount point.
/// Its chain is the caller's middleware, then the source layers covering
/// the route, then the original handlers. Either every route is copied or,
/// on error, none is.
pub(crate) fn mount<R: Router + ?Sized>(caller: &Scope, prefix: &str, source: &R) -> Result<Scope> {
    if prefix.is_empty() {
        return Err(RouteError::EmptyPrefix);
    }
    // Snapshot first: the source may be the very app we are writing into.
    let table = source.route_table()?;
    let mount_point = caller.compose_prefix(prefix)?;
    let engine = caller.engine()?;
    let case_sensitive = engine.config().case_sensitive;

    debug!(
        prefix = %mount_point,
        routes = table.routes.len(),
        layers = table.layers.len(),
        "mount"
    );

    let layers: Vec<Layer> = table
        .layers
        .into_iter()
        .map(|layer| Layer {
            path: join(&mount_point, &layer.path),
            handlers: layer.handlers,
        })
        .collect();

    let routes: Vec<_> = table
        .routes
        .into_iter()
        .map(|route| {
            let path = join(&mount_point, &route.path);
            let captures = route.pattern().param_names().next().is_some();

            let mut chain = Vec::new();
            for layer in &layers {
                if has_path_prefix(&path, &layer.path, case_sensitive) {
                    chain.extend(layer.handlers.iter().cloned());
                } else if captures {
                    // A capturing route may or may not land below the layer.
                    chain.extend(
                        layer
                            .handlers
                            .iter()
                            .map(|h| below(&layer.path, h, case_sensitive)),
                    );
                }
            }
            chain.extend(route.handlers);
            (route.method, path, caller.with_middleware(chain))
        })
        .collect();

    engine.add_routes(routes)?;

    Ok(Scope::new(
        caller.engine_ref(),
        Some(mount_point),
        caller.chain().to_vec(),
    ))
}

/// Runs `inner` only for requests at or below `path`; passes others on.
fn below(path: &str, inner: &Handler, case_sensitive: bool) -> Handler {
    let path: Arc<str> = Arc::from(path);
    let inner = Arc::clone(inner);
    handler(move |ctx| {
        if has_path_prefix(ctx.path(), &path, case_sensitive) {
            inner(ctx)
        } else {
            ctx.next()
        }
    })
}
