#![allow(clippy::unwrap_used, clippy::expect_used)]

//! HTTP adapter against a live server.

mod common;

use common::{INSTANCE_ID, http_client, post_sum, send, start, test_config};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn post_sum_returns_result() {
    let server = start(&test_config()).await;
    let addr = server.http_addr.unwrap();
    let client = http_client();

    let reply = post_sum(&client, addr, r#"{"a":3,"b":4}"#).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"result": 7}));
    assert!(reply.headers.contains_key("x-request-id"));
    assert_eq!(
        reply.headers.get("x-service-id").and_then(|v| v.to_str().ok()),
        Some(INSTANCE_ID)
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn non_integer_operand_is_rejected_with_problem() {
    let server = start(&test_config()).await;
    let addr = server.http_addr.unwrap();
    let client = http_client();

    let reply = post_sum(&client, addr, r#"{"a":"x","b":4}"#).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    assert_eq!(reply.body["code"], "INVALID_INPUT");
    assert_eq!(reply.body["errors"][0]["field"], "a");
    assert_eq!(
        reply.body["trace_id"].as_str(),
        reply.headers.get("x-request-id").and_then(|v| v.to_str().ok())
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn malformed_inputs_never_return_ok() {
    let server = start(&test_config()).await;
    let addr = server.http_addr.unwrap();
    let client = http_client();

    for body in [
        "",
        "{",
        "[]",
        r#"{"a":1}"#,
        r#"{"b":1}"#,
        r#"{"a":1.5,"b":1}"#,
        r#"{"a":null,"b":1}"#,
        r#"{"a":3000000000,"b":1}"#,
        r#"{"a":2147483647,"b":1}"#,
    ] {
        let reply = post_sum(&client, addr, body).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(reply.body.get("result").is_none(), "body {body:?}");
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn repeated_requests_yield_identical_results() {
    let server = start(&test_config()).await;
    let addr = server.http_addr.unwrap();
    let client = http_client();

    let first = post_sum(&client, addr, r#"{"a":-12,"b":40}"#).await;
    for _ in 0..5 {
        let again = post_sum(&client, addr, r#"{"a":-12,"b":40}"#).await;
        assert_eq!(again.status, first.status);
        assert_eq!(again.body, first.body);
    }
    assert_eq!(first.body, json!({"result": 28}));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut cfg = test_config();
    cfg.http.body_limit_bytes = 32;
    let server = start(&cfg).await;
    let addr = server.http_addr.unwrap();
    let client = http_client();

    let body = format!(r#"{{"a":1,"b":2,"pad":"{}"}}"#, "x".repeat(128));
    let reply = post_sum(&client, addr, &body).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn wrong_method_and_path_are_problems() {
    let server = start(&test_config()).await;
    let addr = server.http_addr.unwrap();
    let client = http_client();

    let reply = send(&client, addr, Method::GET, "/sum", None, "").await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);

    let reply = send(&client, addr, Method::POST, "/add", Some("application/json"), "{}").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&client, addr, Method::POST, "/sum", Some("text/plain"), r#"{"a":1,"b":2}"#).await;
    assert_eq!(reply.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn metrics_host_exposes_http_counters() {
    let server = start(&test_config()).await;
    let http_addr = server.http_addr.unwrap();
    let metrics_addr = server.metrics_addr.unwrap();
    let client = http_client();

    post_sum(&client, http_addr, r#"{"a":1,"b":2}"#).await;

    let health = send(&client, metrics_addr, Method::GET, "/health", None, "").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, json!("OK"));

    let metrics = send(&client, metrics_addr, Method::GET, "/metrics", None, "").await;
    assert_eq!(metrics.status, StatusCode::OK);
    let text = metrics.body.as_str().unwrap();
    assert!(text.contains("summation_http_request_total"));
    assert!(text.contains(r#"endpoint="/sum""#));

    server.shutdown().await.unwrap();
}
