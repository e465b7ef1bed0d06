// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! Every GET path is answered by the hello handler, so `/` and `/anything`
//! behave the same.

pub mod handlers;

use axum::{Router, routing::get};
use handlers::hello_handler;

/// Create application routes
pub fn create_routes() -> Router {
    Router::new()
        .route("/", get(hello_handler))
        .route("/{*path}", get(hello_handler))
}
