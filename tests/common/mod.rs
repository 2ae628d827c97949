#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_relay::{router, ChatClient, Container};

/// Serve the proxy on an ephemeral loopback port around `client`.
pub async fn spawn_proxy(client: Arc<dyn ChatClient>, timeout: Duration) -> SocketAddr {
    let container = Arc::new(Container::with_chat_client(client, timeout));
    spawn_router(router(container)).await
}

pub async fn spawn_router(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    addr
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}
