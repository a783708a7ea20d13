//! Integration tests for the session gateway against a mock backend
//!
//! Covers the request envelope, the single refresh-and-retry on 401, the CSRF
//! token lookup and the per-call timeout.


use expense_gateway::gateway::paths;
use expense_gateway::{GatewayConfig, GatewayError, RequestOptions, Session, SessionGateway};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::json;
use std::time::{Duration, Instant};
use test_helpers::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Envelope
// ============================================================================

#[tokio::test]
async fn test_call_sends_json_content_type_and_cookies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CATEGORIES)))
        .and(header("content-type", "application/json"))
        .and(header("cookie", "csrftoken=test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_with_token(&server);
    let response = gw.call(paths::CATEGORIES, RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api(paths::EXPENSES)))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_with_token(&server);
    let options =
        RequestOptions::post().header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    let response = gw.call(paths::EXPENSES, options).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_non_2xx_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api("/expenses/9/")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Nie znaleziono wydatku."})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 200, 0).await;

    let gw = gateway_with_token(&server);
    let response = gw.call("/expenses/9/", RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_endpoint_is_rejected() {
    let server = MockServer::start().await;
    let gw = gateway_with_token(&server);

    let result = gw.call("/admin/", RequestOptions::get()).await;
    assert!(matches!(result, Err(GatewayError::UnknownEndpoint(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// 401 refresh-and-retry
// ============================================================================

#[tokio::test]
async fn test_401_refreshes_and_returns_retried_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api(paths::REFRESH)))
        .and(header("X-CSRFToken", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_with_token(&server);
    let response = gw.call(paths::EXPENSES, RequestOptions::get()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_retry_reuses_identical_options() {
    let server = MockServer::start().await;
    let payload = json!({"category": 2, "amount": "15.00"});

    Mock::given(method("POST"))
        .and(path(api(paths::EXPENSES)))
        .and(header("X-CSRFToken", TEST_TOKEN))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api(paths::EXPENSES)))
        .and(header("X-CSRFToken", TEST_TOKEN))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 200, 1).await;

    let gw = gateway_with_token(&server);
    let options = RequestOptions::post()
        .csrf_token(TEST_TOKEN)
        .unwrap()
        .json(&payload)
        .unwrap();
    let response = gw.call(paths::EXPENSES, options).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_failed_refresh_returns_original_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSE_SUMMARY)))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 401, 1).await;

    let gw = gateway_with_token(&server);
    let response = gw.call(paths::EXPENSE_SUMMARY, RequestOptions::get()).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Token is expired");
}

#[tokio::test]
async fn test_retried_401_is_not_retried_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CATEGORIES)))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, 200, 1).await;

    let gw = gateway_with_token(&server);
    let response = gw.call(paths::CATEGORIES, RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_probe_never_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::IS_LOGGED_IN)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 200, 0).await;

    let gw = gateway_with_token(&server);
    let response = gw.call(paths::IS_LOGGED_IN, RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_fetches_missing_csrf_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api(paths::CSRF_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"csrftoken": "fresh-token"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api(paths::REFRESH)))
        .and(header("X-CSRFToken", "fresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server);
    let response = gw.call(paths::EXPENSES, RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token_failure_passes_401_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api(paths::CSRF_TOKEN)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 200, 0).await;

    let gw = gateway(&server);
    let response = gw.call(paths::EXPENSES, RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_timed_out_refresh_returns_original_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api(paths::REFRESH)))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let config = GatewayConfig::new(format!("{}/api", server.uri()))
        .with_timeout(Duration::from_millis(100));
    let gw = SessionGateway::new(config, Session::new()).unwrap();
    gw.session()
        .add_cookie(&format!("csrftoken={}; Path=/", TEST_TOKEN), &origin(&server));

    let response = gw.call(paths::EXPENSES, RequestOptions::get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Token is expired");
}

#[tokio::test]
async fn test_concurrent_401s_refresh_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api(paths::EXPENSES)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, 200, 2).await;

    let gw = gateway_with_token(&server);
    let (a, b) = tokio::join!(
        gw.call(paths::EXPENSES, RequestOptions::get()),
        gw.call(paths::EXPENSES, RequestOptions::get())
    );
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
}

// ============================================================================
// CSRF token
// ============================================================================

#[tokio::test]
async fn test_ensure_token_skips_network_when_cookie_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CSRF_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"csrftoken": "other"})))
        .expect(0)
        .mount(&server)
        .await;

    let gw = gateway_with_token(&server);
    assert_eq!(gw.ensure_token().await.unwrap(), TEST_TOKEN);
}

#[tokio::test]
async fn test_ensure_token_fetches_when_cookie_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CSRF_TOKEN)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "csrftoken=fetched; Path=/")
                .set_body_json(json!({"csrftoken": "fetched"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server);
    assert_eq!(gw.ensure_token().await.unwrap(), "fetched");
}

#[tokio::test]
async fn test_ensure_token_bad_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CSRF_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server);
    let result = gw.ensure_token().await;
    assert!(matches!(result, Err(GatewayError::Decode(_))));
}

// ============================================================================
// Timeout
// ============================================================================

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CATEGORIES)))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let gw = gateway_with_token(&server);
    let options = RequestOptions::get().timeout(Duration::from_millis(100));
    let result = gw.call(paths::CATEGORIES, options).await;

    let err = result.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn test_configured_timeout_applies_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api(paths::CATEGORIES)))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = GatewayConfig::new(format!("{}/api", server.uri()))
        .with_timeout(Duration::from_millis(100));
    let gw = SessionGateway::new(config, Session::new()).unwrap();

    let result = gw.call(paths::CATEGORIES, RequestOptions::get()).await;
    assert!(matches!(result, Err(GatewayError::Timeout { .. })));
}

#[tokio::test]
async fn test_slow_connect_is_bounded_by_call_timeout() {
    // Never accepts; once the backlog is full further connects stall
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut held = Vec::new();
    for _ in 0..1024 {
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
            Ok(stream) => held.push(stream),
            Err(_) => break,
        }
    }

    let config = GatewayConfig::new(format!("http://{}/api", addr));
    let gw = SessionGateway::new(config, Session::new()).unwrap();
    let call_timeout = Duration::from_secs(6);

    let started = Instant::now();
    let err = gw
        .call(paths::CATEGORIES, RequestOptions::get().timeout(call_timeout))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    assert!(elapsed >= call_timeout, "aborted early after {:?}", elapsed);
    assert!(err.to_string().contains("6000ms"));
    drop(held);
}
