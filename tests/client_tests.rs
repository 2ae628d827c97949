//! End-to-end tests: the chat client talking to a live proxy.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Json;
use serde_json::{json, Value};

use chat_relay::{
    check_connection, check_health, ClientConfig, ConnectionReport, MockChatClient, Role,
    TransportKind, TransportPolicy, NO_ANSWER_FALLBACK,
};
use common::{spawn_proxy, spawn_router};

const TIMEOUT: Duration = Duration::from_secs(5);

fn base_url(addr: std::net::SocketAddr) -> String {
    format!("http://{addr}")
}

#[tokio::test]
async fn test_rest_round_trip_builds_transcript() {
    let mock = Arc::new(MockChatClient::with_reply("hello"));
    let addr = spawn_proxy(mock.clone(), TIMEOUT).await;
    let mut session = ClientConfig::new(base_url(addr)).chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");
    assert_eq!(reply.content(), "hello");
    assert_eq!(reply.role(), Role::Assistant);

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[0].role(), Role::User);
    assert_eq!(transcript.messages()[0].content(), "hi");
    assert_eq!(transcript.messages()[1].content(), "hello");
    assert!(session.last_error().is_none());
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_history_is_sent_with_each_message() {
    let addr = spawn_proxy(Arc::new(MockChatClient::new()), TIMEOUT).await;
    let mut session = ClientConfig::new(base_url(addr)).chat_session();

    session.submit("first").await;
    let reply = session.submit("second").await.expect("Input was not blank");

    assert_eq!(reply.content(), "Echo: second");
    let wire = session.transcript().to_wire();
    assert_eq!(wire.len(), 4);
    assert_eq!(wire[1].content, "Echo: first");
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let mock = Arc::new(MockChatClient::new());
    let addr = spawn_proxy(mock.clone(), TIMEOUT).await;
    let mut session = ClientConfig::new(base_url(addr)).chat_session();

    assert!(session.submit("   ").await.is_none());
    assert!(session.transcript().is_empty());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_graphql_transport_end_to_end() {
    let mock = Arc::new(MockChatClient::with_reply("from graphql"));
    let addr = spawn_proxy(mock.clone(), TIMEOUT).await;
    let config = ClientConfig::new(base_url(addr)).with_policy(TransportPolicy::graphql_only());

    let reply = config
        .send_message_use_case()
        .execute(&[chat_relay::ChatMessage::user("hi")])
        .await
        .expect("GraphQL exchange failed");

    assert_eq!(reply, "from graphql");
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_broken_graphql_endpoint_falls_back_to_rest() {
    let mock = Arc::new(MockChatClient::with_reply("via rest"));
    let addr = spawn_proxy(mock.clone(), TIMEOUT).await;
    let config = ClientConfig::new(base_url(addr))
        .with_graphql_path("/missing")
        .with_policy(TransportPolicy::new(vec![
            TransportKind::GraphQl,
            TransportKind::Rest,
        ]));
    let mut session = config.chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert_eq!(reply.content(), "via rest");
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_attempt_cap_prevents_fallback() {
    let mock = Arc::new(MockChatClient::with_reply("via rest"));
    let addr = spawn_proxy(mock.clone(), TIMEOUT).await;
    let policy = TransportPolicy::new(vec![TransportKind::GraphQl, TransportKind::Rest])
        .with_max_attempts(1);
    let config = ClientConfig::new(base_url(addr))
        .with_graphql_path("/missing")
        .with_policy(policy);
    let mut session = config.chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert!(reply.content().starts_with("An error occurred: "));
    assert!(reply.content().contains("404"));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_proxy_timeout_surfaces_as_fallback_message() {
    let mock = Arc::new(MockChatClient::new().with_delay(Duration::from_secs(3)));
    let addr = spawn_proxy(mock, Duration::from_millis(200)).await;
    let mut session = ClientConfig::new(base_url(addr)).chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert!(reply.content().starts_with("An error occurred: "));
    assert!(reply.content().contains("please retry"));
    assert_eq!(session.transcript().len(), 2);
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn test_client_deadline_applies_to_slow_proxy() {
    let mock = Arc::new(MockChatClient::new().with_delay(Duration::from_secs(3)));
    let addr = spawn_proxy(mock, TIMEOUT).await;
    let mut session = ClientConfig::new(base_url(addr))
        .with_timeout(Duration::from_millis(200))
        .chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert_eq!(
        reply.content(),
        "An error occurred: request timed out, please retry"
    );
}

#[tokio::test]
async fn test_empty_choices_use_no_answer_fallback() {
    let app = axum::Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({"choices": []})) }),
    );
    let addr = spawn_router(app).await;
    let mut session = ClientConfig::new(base_url(addr)).chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert_eq!(reply.content(), NO_ANSWER_FALLBACK);
}

#[tokio::test]
async fn test_client_posts_messages_envelope() {
    let app = axum::Router::new().route(
        "/api/chat",
        post(|Json(body): Json<Value>| async move {
            let count = body["messages"].as_array().map(Vec::len).unwrap_or(0);
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": format!("got {count}")}}]
            }))
        }),
    );
    let addr = spawn_router(app).await;
    let mut session = ClientConfig::new(base_url(addr)).chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert_eq!(reply.content(), "got 1");
}

#[tokio::test]
async fn test_health_check_against_live_proxy() {
    let addr = spawn_proxy(Arc::new(MockChatClient::new()), TIMEOUT).await;
    assert!(check_health(&ClientConfig::new(base_url(addr))).await);

    let config = ClientConfig::new(format!("{}/nowhere", base_url(addr)));
    assert!(!check_health(&config).await);
}

#[tokio::test]
async fn test_transient_failures_are_retried_with_backoff() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = axum::Router::new().route(
        "/api/chat",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    (StatusCode::BAD_GATEWAY, Json(json!({"error": "warming up"}))).into_response()
                } else {
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": "third time"}}]
                    }))
                    .into_response()
                }
            }
        }),
    );
    let addr = spawn_router(app).await;
    let policy = TransportPolicy::rest_only()
        .with_tries_per_transport(3)
        .with_retry_delay(Duration::from_millis(50));
    let mut session = ClientConfig::new(base_url(addr))
        .with_policy(policy)
        .chat_session();

    let started = Instant::now();
    let reply = session.submit("hi").await.expect("Input was not blank");

    assert_eq!(reply.content(), "third time");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 50ms before the second attempt, 100ms before the third.
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_retries_stop_at_tries_per_transport() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = axum::Router::new().route(
        "/api/chat",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::BAD_GATEWAY, Json(json!({"error": "down"})))
            }
        }),
    );
    let addr = spawn_router(app).await;
    let policy = TransportPolicy::rest_only()
        .with_tries_per_transport(2)
        .with_retry_delay(Duration::from_millis(10));
    let mut session = ClientConfig::new(base_url(addr))
        .with_policy(policy)
        .chat_session();

    let reply = session.submit("hi").await.expect("Input was not blank");

    assert_eq!(reply.content(), "An error occurred: HTTP 502: down");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_connection_check_covers_health_and_graphql() {
    let mock = Arc::new(MockChatClient::new());
    let addr = spawn_proxy(mock.clone(), TIMEOUT).await;

    let report = check_connection(&ClientConfig::new(base_url(addr))).await;
    assert_eq!(
        report,
        ConnectionReport {
            health: true,
            graphql: true
        }
    );
    assert!(report.is_connected());

    let broken = ClientConfig::new(base_url(addr)).with_graphql_path("/missing");
    let report = check_connection(&broken).await;
    assert!(report.health);
    assert!(!report.graphql);
    assert!(!report.is_connected());

    assert_eq!(mock.call_count(), 0, "connection checks must not reach the upstream");
}
