// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for starting a server on an ephemeral port

use std::{net::SocketAddr, time::Duration, time::Instant};

use hello_server::{
    Server, ServerConfig, ServerResult, ShutdownConfig, ShutdownOutcome, TimeoutSeconds,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A server running in the background of the test runtime
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<ServerResult<ShutdownOutcome>>,
}

impl TestServer {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }
}

/// Start a server with the given grace period and the default request timeout
pub async fn start(grace_period: Duration) -> TestServer {
    start_with_timeout(grace_period, TimeoutSeconds::default()).await
}

/// Start a server with the given grace period and request timeout
pub async fn start_with_timeout(
    grace_period: Duration,
    request_timeout: TimeoutSeconds,
) -> TestServer {
    let mut config = ServerConfig::for_testing();
    config.request_timeout_seconds = request_timeout;

    let shutdown_config = ShutdownConfig {
        grace_period,
        handle_signals: true,
    };

    let (addr, shutdown, handle) = Server::new(config, shutdown_config, Instant::now())
        .run_for_testing()
        .await
        .expect("Failed to start test server");

    TestServer {
        addr,
        shutdown,
        handle,
    }
}
