//! Socket server: hyper on tokio, with graceful shutdown.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// Serving state shared between the accept loop and shutdown handles.
#[derive(Debug, Default)]
pub(crate) struct ServerState {
    local_addr: Mutex<Option<SocketAddr>>,
    signal: Notify,
    stopped: Notify,
}

impl ServerState {
    fn begin(&self, addr: SocketAddr) -> Result<()> {
        let mut slot = self.local_addr.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = *slot {
            return Err(EngineError::AlreadyListening(current));
        }
        *slot = Some(addr);
        Ok(())
    }

    fn finish(&self) {
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.stopped.notify_waiters();
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stops a running server from any task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    state: Arc<ServerState>,
}

impl ShutdownHandle {
    pub(crate) fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Address the server is bound to, while it is serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state.local_addr()
    }

    /// Stops accepting connections and waits for open ones to finish.
    pub async fn shutdown(&self) -> Result<()> {
        if self.state.local_addr().is_none() {
            return Err(EngineError::NotListening);
        }
        let stopped = self.state.stopped.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        self.state.signal.notify_waiters();
        stopped.await;
        Ok(())
    }
}

/// Binds `addr` and serves until shut down.
///
/// An address with no host, like `":3000"`, binds every interface.
pub async fn listen(engine: Arc<Engine>, addr: &str) -> Result<()> {
    let bind_addr = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| EngineError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;
    serve(engine, listener).await
}

/// Serves an already bound listener until shut down.
pub async fn serve(engine: Arc<Engine>, listener: TcpListener) -> Result<()> {
    let addr = listener.local_addr()?;
    let state = engine.server_state();

    // Registered before `begin` so a shutdown can never slip in unseen.
    let stop = state.signal.notified();
    tokio::pin!(stop);
    stop.as_mut().enable();
    state.begin(addr)?;

    let name = engine.config().app_name.clone().unwrap_or_else(|| "burrow".to_string());
    info!(app = %name, %addr, "listening");

    let graceful = GracefulShutdown::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!(error = %err, "accept failed");
                        continue;
                    }
                };
                debug!(%peer, "connection accepted");

                let engine = Arc::clone(&engine);
                let service = service_fn(move |req| handle_request(req, Arc::clone(&engine)));
                let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                let conn = graceful.watch(conn);

                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        warn!(%peer, error = %err, "error serving connection");
                    }
                });
            }
            () = &mut stop => break,
        }
    }

    info!(%addr, "shutting down");
    drop(listener);
    graceful.shutdown().await;
    state.finish();
    info!(%addr, "stopped");
    Ok(())
}

async fn handle_request(
    req: HyperRequest<Incoming>,
    engine: Arc<Engine>,
) -> std::result::Result<HyperResponse<Full<Bytes>>, Infallible> {
    let response = match into_request(req, engine.config().body_limit).await {
        Ok(request) => engine.handle(request).await,
        Err(status) => Response::status_only(status),
    };
    Ok(into_hyper(response))
}

/// Converts a hyper request, answering with a status on failure.
async fn into_request(req: HyperRequest<Incoming>, body_limit: usize) -> std::result::Result<Request, u16> {
    let Ok(method) = Method::try_from(req.method()) else {
        return Err(501);
    };

    let (parts, body) = req.into_parts();
    let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut request = Request::new(method, target);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request.set_header(name.as_str(), value);
        }
    }

    let collected = Limited::new(body, body_limit).collect().await.map_err(|err| {
        if err.is::<LengthLimitError>() {
            413u16
        } else {
            400u16
        }
    })?;
    request.body = collected.to_bytes().to_vec();
    Ok(request)
}

fn into_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HyperResponse::builder().status(status);
    for (key, value) in &res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder
        .body(Full::new(Bytes::from(res.body)))
        .unwrap_or_else(|err| {
            warn!(error = %err, "invalid response, sending 500");
            let mut fallback = HyperResponse::new(Full::new(Bytes::from_static(
                b"Internal Server Error",
            )));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
