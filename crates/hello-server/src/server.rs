// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server implementation module
//!
//! This module provides the main server struct: router and middleware
//! construction, listener binding, and the hand-off to the
//! [`ShutdownCoordinator`](crate::shutdown::ShutdownCoordinator) for bounded
//! graceful shutdown.

use std::{
    future::Future,
    net::SocketAddr,
    time::{Duration, Instant},
};

use axum::{Router, http::HeaderName};
use hyper::Request;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::{ServerError, ServerResult},
    routes::create_routes,
    shutdown::{ShutdownCoordinator, ShutdownOutcome, ShutdownSignal, ShutdownTrigger},
};

// Server constants
const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for server shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time to wait for in-flight requests before forcing termination
    pub grace_period: Duration,
    /// Capture SIGINT/SIGTERM and shut down gracefully; when false the
    /// process keeps the OS default signal behavior
    pub handle_signals: bool,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
            handle_signals: true,
        }
    }
}

impl From<&ServerConfig> for ShutdownConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            grace_period: config.grace_period(),
            handle_signals: config.signals_enabled(),
        }
    }
}

/// Main server struct
#[derive(Debug)]
pub struct Server {
    /// Server configuration
    config: ServerConfig,
    /// Application router
    router: Router,
    /// Cancellation token for programmatic shutdown requests
    cancellation_token: CancellationToken,
    /// Configuration for coordinated shutdown
    shutdown_config: ShutdownConfig,
    /// When the process started, for the startup latency log
    started_at: Instant,
}

impl Server {
    /// Create new server instance
    pub fn new(config: ServerConfig, shutdown_config: ShutdownConfig, started_at: Instant) -> Self {
        let router = Self::create_router(&config);

        Self {
            config,
            router,
            cancellation_token: CancellationToken::new(),
            shutdown_config,
            started_at,
        }
    }

    /// Create application router with middleware
    fn create_router(config: &ServerConfig) -> Router {
        let timeout_duration = config.request_timeout_seconds.value();

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    if let Some(request_id) = req.headers().get(REQUEST_ID_HEADER) {
                        info_span!("http_request", ?request_id, method = %req.method(), uri = %req.uri())
                    } else {
                        tracing::error!("failed to extract id from request");
                        info_span!("http_request", request_id = "unknown")
                    }
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(TimeoutLayer::new(timeout_duration));

        create_routes().layer(middleware)
    }

    /// Run the server until it is shut down
    ///
    /// Returns once the coordinated shutdown has completed, whether it drained
    /// cleanly or was forced. Shutdown starts on SIGINT/SIGTERM when signal
    /// handling is enabled, and on [`Server::shutdown`] in either case. With
    /// signal handling disabled no signal handlers are registered, so the
    /// signals keep their default OS behavior.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address,
    /// `ServerError::Signal` if the signal handlers cannot be registered, or
    /// `ServerError::Serve` if the server fails while running.
    pub async fn run(self) -> ServerResult<()> {
        let listener = self.bind().await?;

        let signal = if self.shutdown_config.handle_signals {
            Some(ShutdownSignal::install()?)
        } else {
            warn!("signal handling disabled, termination signals use the default OS behavior");
            None
        };
        self.log_started(&listener)?;

        let requested = self.cancellation_token.clone();
        let trigger = async move {
            match signal {
                Some(signal) => tokio::select! {
                    trigger = signal.recv() => trigger,
                    () = requested.cancelled() => ShutdownTrigger::Requested,
                },
                None => {
                    requested.cancelled().await;
                    ShutdownTrigger::Requested
                }
            }
        };

        let outcome = self.serve_until(listener, trigger).await?;
        info!(?outcome, "shutdown completed");
        Ok(())
    }

    async fn bind(&self) -> ServerResult<TcpListener> {
        let addr = self.config.socket_addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })
    }

    fn log_started(&self, listener: &TcpListener) -> ServerResult<SocketAddr> {
        let actual_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;

        info!(
            address = %actual_addr,
            elapsed = ?self.started_at.elapsed(),
            "started server",
        );
        Ok(actual_addr)
    }

    /// Serve on `listener` until `trigger` resolves, then shut down within the
    /// grace period and wait for the coordinator's completion signal
    async fn serve_until<F>(self, listener: TcpListener, trigger: F) -> ServerResult<ShutdownOutcome>
    where
        F: Future<Output = ShutdownTrigger> + Send + 'static,
    {
        let coordinator = ShutdownCoordinator::new(self.shutdown_config.grace_period);
        let drain = coordinator.drain_token();

        let router = self.router;
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(drain.cancelled_owned())
                .await
        });

        let (done_tx, done_rx) = oneshot::channel();
        info!("spawning the graceful shutdown task");
        tokio::spawn(coordinator.run(trigger, server, done_tx));

        done_rx.await.map_err(|_| ServerError::Runtime {
            message: "shutdown coordinator exited without reporting completion".to_string(),
        })?
    }

    /// Returns a clone of the cancellation token for coordinated shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Requests a graceful shutdown, bounded by the configured grace period
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Run server for testing, returns the bound address
    ///
    /// The server shuts down through the coordinator when the returned token
    /// is cancelled; the join handle resolves to the shutdown outcome.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address.
    pub async fn run_for_testing(
        self,
    ) -> ServerResult<(
        SocketAddr,
        CancellationToken,
        JoinHandle<ServerResult<ShutdownOutcome>>,
    )> {
        let listener = self.bind().await?;
        let actual_addr = self.log_started(&listener)?;

        let token = self.cancellation_token.clone();
        let requested = token.clone();
        let trigger = async move {
            requested.cancelled().await;
            ShutdownTrigger::Requested
        };

        let handle = tokio::spawn(self.serve_until(listener, trigger));
        Ok((actual_addr, token, handle))
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

}
