// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides the error types for server operations and maps
//! request-scoped errors onto plaintext HTTP responses.

use std::{net::SocketAddr, num::ParseIntError};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Errors reported by the HTTP server while serving or draining
    #[error("HTTP server error: {source}")]
    Serve {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Runtime errors during server operation
    #[error("Runtime error: {message}")]
    Runtime {
        /// Error message
        message: String,
    },

    /// Task join errors for async operations
    #[error("Task join error: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// Signal handling errors
    #[error("Signal handling error: {message}")]
    Signal {
        /// Error message
        message: String,
    },

    /// The `sleep` query parameter is not an integer
    #[error("invalid sleep value {value:?}: {source}")]
    InvalidSleep {
        /// Raw value supplied by the client
        value: String,
        /// Integer parse failure
        #[source]
        source: ParseIntError,
    },

    /// The query string could not be decoded
    #[error("invalid query string: {message}")]
    InvalidQuery {
        /// Rejection message
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status code used when this error reaches a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSleep { .. } | Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Serve { .. }
            | Self::Runtime { .. }
            | Self::TaskJoin { .. }
            | Self::Signal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleep_error(value: &str) -> ServerError {
        let source = value
            .parse::<i64>()
            .expect_err("value should not parse as i64");
        ServerError::InvalidSleep {
            value: value.to_string(),
            source,
        }
    }

    #[test]
    fn invalid_sleep_is_bad_request() {
        let error = sleep_error("abc");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.to_string(),
            "invalid sleep value \"abc\": invalid digit found in string"
        );
    }

    #[test]
    fn runtime_errors_are_internal() {
        let error = ServerError::Runtime {
            message: "boom".to_string(),
        };
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_plaintext_message() {
        let response = sleep_error("1.5").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        assert_eq!(content_type, Some("text/plain; charset=utf-8"));
    }
}
