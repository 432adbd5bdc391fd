//! HTTP Server configuration and startup.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tower::Service;
use tower_http::catch_panic::CatchPanicLayer;

use currencier_types::{CurrencyRepository, CurrencySource};

use super::access_log::access_log;
use super::handlers::{self, AppState};
use crate::CurrencierService;
use crate::shutdown::Shutdown;

/// How long in-flight requests may run after shutdown is requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP Server for the Currencier read API.
pub struct HttpServer<S: CurrencySource, R: CurrencyRepository> {
    state: Arc<AppState<S, R>>,
    grace: Duration,
}

impl<S: CurrencySource, R: CurrencyRepository> HttpServer<S, R> {
    /// Creates a new HTTP server over a service shared with the scheduler.
    pub fn new(service: Arc<CurrencierService<S, R>>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            grace: SHUTDOWN_GRACE,
        }
    }

    /// Overrides how long in-flight requests may run after shutdown.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/", get(handlers::list_currencies::<S, R>))
            .route("/currencies", get(handlers::list_currencies::<S, R>))
            .route("/lazycurrencies", get(handlers::lazy_currencies::<S, R>))
            .route("/currency", get(handlers::missing_id))
            .route("/currency/", get(handlers::missing_id))
            .route("/currency/{id}", get(handlers::get_currency::<S, R>))
            .layer(middleware::from_fn(access_log))
            .layer(CatchPanicLayer::custom(handle_panic))
            .with_state(self.state.clone())
    }

    /// Serves on an already bound listener until `shutdown` fires.
    ///
    /// After the signal the listener is closed and idle keep-alive
    /// connections are shut down. Requests still running after the grace
    /// period have their connection tasks aborted, which closes the socket
    /// and drops the request future.
    pub async fn serve(self, listener: TcpListener, shutdown: Shutdown) -> anyhow::Result<()> {
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let router = self.router();
        let mut connections = JoinSet::new();
        let mut stop = shutdown.clone();

        loop {
            let (stream, remote_addr) = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                Some(_) = connections.join_next(), if !connections.is_empty() => continue,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                },
            };

            connections.spawn(serve_connection(
                router.clone(),
                stream,
                remote_addr,
                shutdown.clone(),
            ));
        }

        drop(listener);
        tracing::info!("Shutdown signal received, starting graceful shutdown...");

        let drained = tokio::time::timeout(self.grace, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                "{} connections still open after {:?}, closing",
                connections.len(),
                self.grace
            );
            connections.shutdown().await;
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Drives one HTTP/1.1 connection; switches to a graceful close on shutdown.
async fn serve_connection(
    router: Router,
    stream: TcpStream,
    remote_addr: SocketAddr,
    mut shutdown: Shutdown,
) {
    let service = service_fn(move |mut request: Request<Incoming>| {
        request.extensions_mut().insert(ConnectInfo(remote_addr));
        router.clone().call(request)
    });

    let builder = http1::Builder::new();
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        _ = shutdown.cancelled() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };
    if let Err(e) = result {
        tracing::debug!("Connection from {} ended with error: {}", remote_addr, e);
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
