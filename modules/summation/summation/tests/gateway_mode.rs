#![allow(clippy::unwrap_used, clippy::expect_used)]

//! HTTP adapter forwarding to a remote gRPC summation backend.

mod common;

use std::time::Duration;

use common::{http_client, post_sum, start, test_config};
use http::StatusCode;
use serde_json::json;
use summation::AppConfig;
use summation::config::BackendKind;

fn gateway_config(endpoint: String) -> AppConfig {
    let mut cfg = test_config();
    cfg.grpc.enabled = false;
    cfg.metrics.enabled = false;
    cfg.backend.kind = BackendKind::Grpc;
    cfg.backend.endpoint = endpoint;
    cfg.backend.connect_timeout = Duration::from_millis(500);
    cfg.backend.rpc_timeout = Duration::from_secs(2);
    cfg.backend.max_retries = 0;
    cfg
}

#[tokio::test]
async fn http_request_is_served_by_remote_grpc_backend() {
    let mut backend_cfg = test_config();
    backend_cfg.http.enabled = false;
    backend_cfg.metrics.enabled = false;
    let backend = start(&backend_cfg).await;
    let grpc_addr = backend.grpc_addr.unwrap();

    let gateway = start(&gateway_config(format!("http://{grpc_addr}"))).await;
    let client = http_client();
    let addr = gateway.http_addr.unwrap();

    let reply = post_sum(&client, addr, r#"{"a":3,"b":4}"#).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"result": 7}));

    let reply = post_sum(&client, addr, r#"{"a":2147483647,"b":1}"#).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    gateway.shutdown().await.unwrap();
    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() {
    // Bind and drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let gateway = start(&gateway_config(format!("http://127.0.0.1:{port}"))).await;
    let client = http_client();

    let reply = post_sum(&client, gateway.http_addr.unwrap(), r#"{"a":1,"b":2}"#).await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.body["code"], "BACKEND_UNAVAILABLE");
    assert!(reply.body.get("result").is_none());

    gateway.shutdown().await.unwrap();
}
