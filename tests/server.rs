// Drives the composition root over a real socket.
use std::time::Duration;

use faultline::config::CoreConfig;
use faultline::start_server;
use faultline_server::config::ServerConfig;
use faultline_server::error_response::REQUEST_ID_HEADER;

async fn spawn() -> anyhow::Result<faultline::ServerHandle> {
    let config = ServerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        core: CoreConfig {
            service_name: "faultline-test".to_string(),
            ..CoreConfig::default()
        },
        cors_allowed_origins: vec!["*".to_string()],
        request_timeout: Duration::from_secs(5),
    };
    start_server(config).await
}

#[tokio::test]
async fn health_reports_ok_without_database() {
    let handle = spawn().await.expect("server started");

    let response = reqwest::Client::new()
        .get(format!("http://{}/health", handle.addr))
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_success());
    let body = response.json::<serde_json::Value>().await.expect("json body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "faultline-test");
    assert_eq!(body["database"], "disabled");

    handle.shutdown();
}

#[tokio::test]
async fn unknown_route_returns_structured_not_found() {
    let handle = spawn().await.expect("server started");

    let response = reqwest::Client::new()
        .delete(format!("http://{}/chat/rooms/9", handle.addr))
        .header(REQUEST_ID_HEADER, "req-404")
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status().as_u16(), 404);
    let body = response.json::<serde_json::Value>().await.expect("json body");
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["errorType"], "NOT_FOUND");
    assert_eq!(body["module"], "router");
    assert_eq!(body["trace"], "req-404");
    assert_eq!(body["message"], "no route for DELETE /chat/rooms/9");

    handle.shutdown();
}

#[tokio::test]
async fn bind_listener_rejects_malformed_address() {
    let config = ServerConfig {
        bind_address: "not-an-address".to_string(),
        ..ServerConfig::default()
    };
    let err = faultline_server::bind_listener(&config).await.unwrap_err();
    assert!(err.to_string().contains("invalid server bind address"));
}
