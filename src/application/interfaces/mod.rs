mod chat_client;
mod proxy_transport;

pub use chat_client::*;
pub use proxy_transport::*;
