//! # burrow
//!
//! Route groups, path prefixes and sub-app mounting on top of
//! [`burrow_http`].
//!
//! This crate provides:
//! - [`App`]: owns the engine, registers routes, serves traffic
//! - [`Scope`]: an immutable prefix + middleware view of an app
//! - [`Router`]: the operations both of them share
//! - Mounting one app's routes into another app's namespace
//!
//! ## Quick Start
//!
//! ```ignore
//! use burrow::{handler, App, Request, Response, Router};
//!
//! let app = App::new();
//! app.prefix("/v1", vec![])?
//!     .get("/hello", vec![handler(|_ctx| async { Ok(Response::text("Hello, World!")) })])?;
//!
//! let res = app.test(Request::get("/v1/hello")).await?;
//! assert_eq!(res.status, 200);
//! ```
//!
//! ## Prefixes
//!
//! Prefixes compose root to leaf with exactly one `/` at every boundary,
//! whether or not the pieces carry their own slashes:
//!
//! ```ignore
//! let hello = app.prefix("/v1", vec![])?.prefix("hello", vec![])?;
//! hello.get("x", vec![h])?; // GET /v1/hello/x
//! ```
//!
//! ## Middleware
//!
//! A scope's middleware runs ahead of every route registered through it,
//! outermost scope first. Middleware that answers without calling
//! `ctx.next()` stops the chain:
//!
//! ```ignore
//! let api = app.group(vec![auth])?.prefix("api", vec![audit])?;
//! api.get("/users", vec![list_users])?; // auth, audit, list_users
//! ```
//!
//! ## Mounting
//!
//! ```ignore
//! let islands = App::new();
//! islands.get("/", vec![index])?;
//!
//! app.mount("islands", &islands)?; // GET /islands/
//! ```
//!
//! Mount copies the source's routes as they are at the time of the call.

mod app;
mod error;
mod mount;
mod router;
mod scope;

pub use app::{App, DEFAULT_TEST_TIMEOUT};
pub use error::{Result, RouteError};
pub use mount::RouteTable;
pub use router::Router;
pub use scope::Scope;

pub use burrow_http::{
    handler, Config, Ctx, EngineError, Handler, HandlerResult, HttpError, Method, Request,
    Response, Route, ShutdownHandle, StaticConfig,
};
