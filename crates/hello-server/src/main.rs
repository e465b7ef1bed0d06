// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Hello World HTTP server

use std::time::Instant;

use anyhow::Result;
use hello_server::{Server, ServerConfig, ShutdownConfig};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let started_at = Instant::now();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().inspect_err(|e| error!(error = %e, "invalid configuration"))?;

    let shutdown_config = ShutdownConfig::from(&config);
    info!(
        port = config.port.value(),
        grace_period = ?shutdown_config.grace_period,
        handle_signals = shutdown_config.handle_signals,
        "configuration loaded",
    );

    let server = Server::new(config, shutdown_config, started_at);

    // NOTE: the `#[tokio::main]` task does not run a worker future, we must spawn
    tokio::spawn(async move { server.run().await })
        .await?
        .inspect_err(|e| error!(error = %e, "HTTP server error"))?;

    Ok(())
}
