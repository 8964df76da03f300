//! HTTP-level tests for the short-code probe and the reqwest transport

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use linkdash::api::probe::{BackendProbe, ShortCodeProbe};
use linkdash::client::{ApiRequest, HttpTransport, ReqwestTransport};

fn probe_for(server: &Server) -> BackendProbe {
    BackendProbe::new(server.url(), Duration::from_secs(2)).unwrap()
}

// =============================================================================
// BackendProbe
// =============================================================================

#[tokio::test]
async fn test_probe_reads_location_from_redirect() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/abc123")
        .with_status(302)
        .with_header("location", "https://example.com/long")
        .create_async()
        .await;

    let target = probe_for(&server).resolve("abc123").await.unwrap();

    assert_eq!(target.as_deref(), Some("https://example.com/long"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_probe_permanent_redirect() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/docs")
        .with_status(308)
        .with_header("location", "https://docs.example.com")
        .create_async()
        .await;

    let target = probe_for(&server).resolve("docs").await.unwrap();
    assert_eq!(target.as_deref(), Some("https://docs.example.com"));
}

#[tokio::test]
async fn test_probe_not_found_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    assert!(probe_for(&server).resolve("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_probe_ok_status_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pricing")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    assert!(probe_for(&server).resolve("pricing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_probe_redirect_without_location_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/broken")
        .with_status(302)
        .create_async()
        .await;

    assert!(probe_for(&server).resolve("broken").await.unwrap().is_none());
}

#[tokio::test]
async fn test_probe_unreachable_backend_is_error() {
    let probe = BackendProbe::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    assert!(probe.resolve("abc123").await.is_err());
}

// =============================================================================
// ReqwestTransport
// =============================================================================

#[tokio::test]
async fn test_transport_sends_bearer_query_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/links")
        .match_header("authorization", "Bearer access-1")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .match_body(Matcher::Json(json!({"originalUrl": "https://example.org"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"data":{"id":"link-6"}}"#)
        .create_async()
        .await;

    let transport = ReqwestTransport::new(format!("{}/api", server.url()), Duration::from_secs(2))
        .unwrap();
    let mut request = ApiRequest::post("/links")
        .with_query("page", 2)
        .with_json(&json!({"originalUrl": "https://example.org"}))
        .unwrap();
    request.bearer = Some("access-1".to_string());

    let reply = transport.send(&request).await.unwrap();

    assert_eq!(reply.status, 201);
    assert!(reply.is_success());
    let body: serde_json::Value = reply.decode().unwrap();
    assert_eq!(body["data"]["id"], "link-6");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_marks_replay() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/links")
        .match_header("x-retry", "true")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let transport = ReqwestTransport::new(server.url(), Duration::from_secs(2)).unwrap();
    let mut request = ApiRequest::get("/links");
    request.retried = true;

    assert_eq!(transport.send(&request).await.unwrap().status, 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_returns_error_status_as_reply() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/links")
        .with_status(401)
        .with_body(r#"{"success":false,"error":"Unauthorized"}"#)
        .create_async()
        .await;

    let transport = ReqwestTransport::new(server.url(), Duration::from_secs(2)).unwrap();
    let reply = transport.send(&ApiRequest::get("/links")).await.unwrap();

    assert_eq!(reply.status, 401);
    assert!(!reply.is_success());
}
