// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Custom extractors for request latency control
//!
//! Axum's typed `Query` rejects repeated keys and leaks a generic
//! deserialization message; this extractor takes the first `sleep` value and
//! reports the raw value together with the integer parse error.

use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use tracing::debug;

use crate::error::{ServerError, ServerResult};

const SLEEP_PARAM: &str = "sleep";

/// Parse a `sleep` value as a whole number of seconds
///
/// Negative values parse but mean no delay.
///
/// # Errors
///
/// Returns `ServerError::InvalidSleep` if `value` is not an integer.
pub fn parse_sleep(value: &str) -> ServerResult<Duration> {
    let seconds = value
        .parse::<i64>()
        .map_err(|source| ServerError::InvalidSleep {
            value: value.to_string(),
            source,
        })?;
    Ok(Duration::from_secs(u64::try_from(seconds).unwrap_or(0)))
}

/// Requested response delay taken from the `sleep` query parameter.
///
/// A missing or empty parameter yields a zero delay. When the key repeats,
/// the first value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepQuery(pub Duration);

impl<S> FromRequestParts<S> for SleepQuery
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(
            |rejection| ServerError::InvalidQuery {
                message: rejection.body_text(),
            },
        )?;

        let raw = pairs
            .into_iter()
            .find_map(|(key, value)| (key == SLEEP_PARAM).then_some(value))
            .filter(|value| !value.is_empty());
        debug!(sleep = raw.as_deref().unwrap_or("0"), "sleep val");

        match raw {
            Some(value) => parse_sleep(&value).map(Self),
            None => Ok(Self(Duration::ZERO)),
        }
    }
}
