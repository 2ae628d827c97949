mod client_config;
mod graphql_transport;
mod mock_chat_client;
mod openai_compat_client;
mod rest_transport;

pub use client_config::*;
pub use graphql_transport::*;
pub use mock_chat_client::*;
pub use openai_compat_client::*;
pub use rest_transport::RestTransport;
