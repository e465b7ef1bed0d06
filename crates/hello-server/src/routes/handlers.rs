// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module

use crate::extractors::SleepQuery;

/// Fixed response body
pub const HELLO_BODY: &str = "Hello World";

/// Hello handler
///
/// Waits for the duration requested through `?sleep=<seconds>` and then
/// answers with [`HELLO_BODY`]. Only this request is delayed; the wait is an
/// async sleep and does not hold a runtime worker.
pub async fn hello_handler(SleepQuery(delay): SleepQuery) -> &'static str {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    HELLO_BODY
}
