//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Upstream provider (OpenAI-compatible HTTP, plus a mock)
//! - Proxy transports used by the client (REST and GraphQL)
//! - The proxy's own HTTP surface (axum router, GraphQL resolver)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::{router, serve, Container, ContainerConfig};
