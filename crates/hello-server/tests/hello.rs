// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the hello endpoint

mod fixtures;

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use hello_server::{HELLO_BODY, TimeoutSeconds};

#[tokio::test]
async fn hello_without_sleep() {
    let server = fixtures::start(Duration::from_secs(5)).await;

    let response = reqwest::get(server.url("/"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.expect("body"), HELLO_BODY);
}

#[tokio::test]
async fn sleep_zero_matches_missing_parameter() {
    let server = fixtures::start(Duration::from_secs(5)).await;
    let client = reqwest::Client::new();

    for path in ["/", "/?sleep=0", "/?sleep="] {
        let started = Instant::now();
        let response = client
            .get(server.url(path))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::OK, "path {path}");
        assert_eq!(response.text().await.expect("body"), HELLO_BODY);
        assert!(started.elapsed() < Duration::from_secs(1), "path {path}");
    }
}

#[tokio::test]
async fn sleep_delays_response() {
    let server = fixtures::start(Duration::from_secs(5)).await;

    let started = Instant::now();
    let response = reqwest::get(server.url("/?sleep=1"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), HELLO_BODY);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn sleep_only_delays_its_own_request() {
    let server = fixtures::start(Duration::from_secs(5)).await;
    let client = reqwest::Client::new();

    let slow = tokio::spawn(client.get(server.url("/?sleep=2")).send());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let fast = client
        .get(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(fast.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(1));

    let slow = slow.await.expect("join").expect("slow request");
    assert_eq!(slow.status(), StatusCode::OK);
}

#[tokio::test]
async fn any_path_is_served() {
    let server = fixtures::start(Duration::from_secs(5)).await;

    let response = reqwest::get(server.url("/some/nested/path?sleep=0"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), HELLO_BODY);
}

#[tokio::test]
async fn invalid_sleep_is_bad_request() {
    let server = fixtures::start(Duration::from_secs(5)).await;
    let client = reqwest::Client::new();

    for value in ["abc", "1.5", "2s"] {
        let response = client
            .get(server.url(&format!("/?sleep={value}")))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "sleep={value}");
        let body = response.text().await.expect("body");
        assert!(!body.is_empty());
        assert!(body.contains("invalid sleep value"), "body: {body}");
    }
}

#[tokio::test]
async fn negative_sleep_responds_immediately() {
    let server = fixtures::start(Duration::from_secs(5)).await;

    let started = Instant::now();
    let response = reqwest::get(server.url("/?sleep=-1"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), HELLO_BODY);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn repeated_sleep_uses_first_value() {
    let server = fixtures::start(Duration::from_secs(5)).await;

    let started = Instant::now();
    let response = reqwest::get(server.url("/?sleep=0&sleep=1"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), HELLO_BODY);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn non_get_methods_are_rejected() {
    let server = fixtures::start(Duration::from_secs(5)).await;

    let response = reqwest::Client::new()
        .post(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn request_timeout_cuts_off_long_sleeps() {
    let timeout = TimeoutSeconds::new(1).expect("valid timeout");
    let server = fixtures::start_with_timeout(Duration::from_secs(5), timeout).await;

    let started = Instant::now();
    let response = reqwest::get(server.url("/?sleep=10"))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(5));
}
