// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Hello World HTTP server with configurable latency and graceful shutdown
//!
//! `GET /?sleep=<seconds>` answers `Hello World` after the requested delay.
//! On SIGINT or SIGTERM the server stops accepting connections and gives
//! in-flight requests a bounded grace period to finish before it is forced
//! down.
//!
//! # Module Structure
//!
//! - [`config`]: environment-driven configuration (`PORT`, `NO_SIGNALS`, `GRACE_PERIOD_DURATION`)
//! - [`error`]: error types and plaintext HTTP error responses
//! - [`extractors`]: the `sleep` query parameter extractor
//! - [`routes`]: route table and the hello handler
//! - [`server`]: listener, middleware stack and server lifecycle
//! - [`shutdown`]: signal capture and the bounded shutdown coordinator

pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod shutdown;

pub use config::{GracePeriod, ServerConfig, ServerPort, TimeoutSeconds};
pub use error::{ServerError, ServerResult};
pub use routes::handlers::HELLO_BODY;
pub use server::{Server, ShutdownConfig};
pub use shutdown::{ShutdownCoordinator, ShutdownOutcome, ShutdownSignal, ShutdownTrigger};
