//! # burrow-http
//!
//! The HTTP engine underneath `burrow`.
//!
//! This crate provides:
//! - Path pattern matching with parameters and wildcards
//! - A flat route table matched in registration order
//! - Handler chains with `next()`, so middleware is just another handler
//! - Path-scoped middleware layers
//! - Static file routes
//! - In-process dispatch for tests, and a hyper server with graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use burrow_http::{handler, Engine, Method, Request, Response};
//!
//! let engine = Engine::default();
//! engine.add_route(
//!     Method::Get,
//!     "/users/{id}",
//!     vec![handler(|ctx| async move {
//!         Ok(Response::text(format!("user {}", ctx.param("id").unwrap_or("?"))))
//!     })],
//! )?;
//!
//! let res = engine.handle(Request::get("/users/7")).await;
//! assert_eq!(res.body_string(), Some("user 7".to_string()));
//! ```
//!
//! ## Handler chains
//!
//! A route holds an ordered list of handlers. Each one either answers or
//! calls `ctx.next().await` to hand over to the rest of the chain:
//!
//! ```ignore
//! let version = handler(|ctx| async move {
//!     let res = ctx.next().await?;
//!     Ok(res.header("X-Api-Version", "1.0.0"))
//! });
//! engine.add_route(Method::Get, "/", vec![version, index])?;
//! ```

mod config;
mod engine;
mod error;
mod handler;
mod method;
mod path;
mod request;
mod response;
mod server;
mod static_files;

pub use config::{Config, DEFAULT_BODY_LIMIT};
pub use engine::{Engine, ErrorHandler, Layer, Route};
pub use error::{EngineError, HttpError, Result};
pub use handler::{handler, Ctx, Handler, HandlerResult};
pub use method::Method;
pub use path::{has_path_prefix, MatchOptions, PathPattern, PathSegment};
pub use request::{PathParams, Request};
pub use response::Response;
pub use server::{listen, serve, ShutdownHandle};
pub use static_files::{content_type_for, static_handler, StaticConfig, FILE_PARAM};
