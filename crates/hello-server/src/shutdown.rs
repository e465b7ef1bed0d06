// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shutdown coordination module
//!
//! The coordinator runs alongside the HTTP server and walks through
//! `WAITING -> SIGNAL_RECEIVED -> SHUTTING_DOWN -> DONE`:
//!
//! 1. wait for a [`ShutdownTrigger`] (SIGINT, SIGTERM or a programmatic request)
//! 2. cancel the drain token so the server stops accepting connections
//! 3. wait for in-flight requests, at most for the grace period, aborting the
//!    server task if they do not finish in time
//! 4. report the [`ShutdownOutcome`] once over a oneshot channel
//!
//! A forced shutdown is not an error: it is logged and reported as
//! [`ShutdownOutcome::Forced`].

use std::{fmt, future::Future, io, time::Duration};

use tokio::{sync::oneshot, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{ServerError, ServerResult};

/// What started the shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// Shutdown requested through the server's cancellation token
    Requested,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownTrigger::Interrupt => write!(f, "SIGINT"),
            ShutdownTrigger::Terminate => write!(f, "SIGTERM"),
            ShutdownTrigger::Requested => write!(f, "shutdown request"),
        }
    }
}

/// How the server stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All in-flight requests finished within the grace period
    Graceful,
    /// The grace period elapsed and the server was stopped with requests still running
    Forced {
        /// Grace period that was exceeded
        grace_period: Duration,
    },
}

/// Registered SIGINT/SIGTERM listeners.
///
/// Handlers are registered by [`ShutdownSignal::install`], before the server
/// starts accepting, so a registration failure is a startup error.
#[derive(Debug)]
pub struct ShutdownSignal {
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    /// Register the termination signal handlers
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Signal` if a handler cannot be registered.
    #[cfg(unix)]
    pub fn install() -> ServerResult<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        let sigterm = signal(SignalKind::terminate()).map_err(|e| ServerError::Signal {
            message: format!("failed to register SIGTERM handler: {e}"),
        })?;
        let sigint = signal(SignalKind::interrupt()).map_err(|e| ServerError::Signal {
            message: format!("failed to register SIGINT handler: {e}"),
        })?;

        Ok(Self { sigterm, sigint })
    }

    /// Register the termination signal handlers
    ///
    /// # Errors
    ///
    /// Never fails on this platform; Ctrl+C is registered when first awaited.
    #[cfg(not(unix))]
    pub fn install() -> ServerResult<Self> {
        Ok(Self {})
    }

    /// Wait for the first termination signal
    #[cfg(unix)]
    pub async fn recv(mut self) -> ShutdownTrigger {
        tokio::select! {
            _ = self.sigterm.recv() => ShutdownTrigger::Terminate,
            _ = self.sigint.recv() => ShutdownTrigger::Interrupt,
        }
    }

    /// Wait for the first termination signal
    #[cfg(not(unix))]
    pub async fn recv(self) -> ShutdownTrigger {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for CTRL+C, graceful shutdown unavailable");
            std::future::pending::<()>().await;
        }
        ShutdownTrigger::Interrupt
    }
}

/// Coordinates a bounded graceful shutdown of a running server task
#[derive(Debug)]
pub struct ShutdownCoordinator {
    grace_period: Duration,
    drain: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with the given grace period
    pub fn new(grace_period: Duration) -> Self {
        Self {
            grace_period,
            drain: CancellationToken::new(),
        }
    }

    /// Token the server watches to begin draining
    pub fn drain_token(&self) -> CancellationToken {
        self.drain.clone()
    }

    /// Drive the shutdown of `server` once `signal` resolves and report the
    /// result through `done`
    ///
    /// `done` is sent exactly once, after the server task has finished or
    /// been aborted.
    pub async fn run<S>(
        self,
        signal: S,
        mut server: JoinHandle<io::Result<()>>,
        done: oneshot::Sender<ServerResult<ShutdownOutcome>>,
    ) where
        S: Future<Output = ShutdownTrigger>,
    {
        let result = self.coordinate(signal, &mut server).await;
        if done.send(result).is_err() {
            warn!("shutdown completion receiver dropped before shutdown finished");
        }
    }

    async fn coordinate<S>(
        &self,
        signal: S,
        server: &mut JoinHandle<io::Result<()>>,
    ) -> ServerResult<ShutdownOutcome>
    where
        S: Future<Output = ShutdownTrigger>,
    {
        let trigger = tokio::select! {
            trigger = signal => trigger,
            joined = &mut *server => {
                let error = Self::unexpected_exit(joined);
                error!(error = %error, "server stopped before shutdown was requested");
                return Err(error);
            }
        };

        warn!(
            %trigger,
            grace_period = ?self.grace_period,
            "server is shutting down",
        );
        self.drain.cancel();

        match tokio::time::timeout(self.grace_period, &mut *server).await {
            Ok(Ok(Ok(()))) => {
                info!("server has been shut down");
                Ok(ShutdownOutcome::Graceful)
            }
            Ok(Ok(Err(source))) => {
                error!(error = %source, "server failed while draining");
                Err(ServerError::Serve { source })
            }
            Ok(Err(source)) => {
                error!(error = %source, "server task failed while draining");
                Err(ServerError::TaskJoin { source })
            }
            Err(_elapsed) => {
                server.abort();
                warn!(
                    grace_period = ?self.grace_period,
                    "server is forced to shut down, in-flight requests exceeded the grace period",
                );
                Ok(ShutdownOutcome::Forced {
                    grace_period: self.grace_period,
                })
            }
        }
    }

    fn unexpected_exit(joined: Result<io::Result<()>, tokio::task::JoinError>) -> ServerError {
        match joined {
            Ok(Ok(())) => ServerError::Runtime {
                message: "server stopped without a shutdown request".to_string(),
            },
            Ok(Err(source)) => ServerError::Serve { source },
            Err(source) => ServerError::TaskJoin { source },
        }
    }
}
