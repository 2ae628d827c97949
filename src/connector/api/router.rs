use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use super::container::Container;
use super::controller::{
    chat, chat_method_not_allowed, graphql, graphql_method_not_allowed, health,
    health_method_not_allowed, not_found,
};
use super::cors::cors_middleware;

pub const CHAT_PATH: &str = "/api/chat";
pub const GRAPHQL_PATHS: [&str; 2] = ["/graphql", "/api/graphql"];
pub const HEALTH_PATHS: [&str; 2] = ["/health", "/api/health"];

/// HTTP surface of the proxy.
pub fn router(container: Arc<Container>) -> axum::Router {
    let mut router = axum::Router::new()
        .route(CHAT_PATH, post(chat).fallback(chat_method_not_allowed));

    for path in GRAPHQL_PATHS {
        router = router.route(path, post(graphql).fallback(graphql_method_not_allowed));
    }
    for path in HEALTH_PATHS {
        router = router.route(path, get(health).fallback(health_method_not_allowed));
    }

    router
        .fallback(not_found)
        .with_state(container)
        .layer(middleware::from_fn(cors_middleware))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(container: Arc<Container>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Chat relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(container))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
