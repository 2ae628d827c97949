mod chat_session;
mod forward_chat;
mod send_message;

pub use chat_session::*;
pub use forward_chat::*;
pub use send_message::*;
