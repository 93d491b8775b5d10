#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared helpers: start a server on ephemeral ports and talk to it over HTTP and gRPC.

use std::net::SocketAddr;

use axum::body::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use summation::{AppConfig, RunningServer};
use summation_sdk::{GrpcClientConfig, RpcRetryConfig, SERVICE_NAME, SummationGrpcClient};
use tokio_util::sync::CancellationToken;

pub const INSTANCE_ID: &str = "test-node";

/// Configuration with every listener on `127.0.0.1:0`.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.server.instance_id = Some(INSTANCE_ID.to_owned());
    "127.0.0.1:0".clone_into(&mut cfg.http.bind_addr);
    "127.0.0.1:0".clone_into(&mut cfg.grpc.listen_addr);
    "127.0.0.1:0".clone_into(&mut cfg.metrics.bind_addr);
    cfg
}

pub async fn start(cfg: &AppConfig) -> RunningServer {
    summation::start(cfg, CancellationToken::new())
        .await
        .expect("server should start")
}

pub struct HttpReply {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: serde_json::Value,
}

pub type HttpClient = Client<HttpConnector, Full<Bytes>>;

pub fn http_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build_http()
}

pub async fn send(
    client: &HttpClient,
    addr: SocketAddr,
    method: Method,
    path: &str,
    content_type: Option<&str>,
    body: &str,
) -> HttpReply {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("http://{addr}{path}"));
    if let Some(ct) = content_type {
        builder = builder.header(http::header::CONTENT_TYPE, ct);
    }
    let req = builder
        .body(Full::new(Bytes::from(body.to_owned())))
        .unwrap();

    let res = client.request(req).await.expect("HTTP request failed");
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    HttpReply {
        status,
        headers,
        body,
    }
}

pub async fn post_sum(client: &HttpClient, addr: SocketAddr, body: &str) -> HttpReply {
    send(client, addr, Method::POST, "/sum", Some("application/json"), body).await
}

pub async fn grpc_client(addr: SocketAddr) -> SummationGrpcClient {
    let mut cfg = GrpcClientConfig::new(SERVICE_NAME);
    cfg.retry = RpcRetryConfig::new(0);
    SummationGrpcClient::connect(format!("http://{addr}"), &cfg)
        .await
        .expect("gRPC connect failed")
}
