mod chat_message;
mod chat_request;
mod completion;
mod transcript;
mod transport;

pub use chat_message::*;
pub use chat_request::*;
pub use completion::*;
pub use transcript::*;
pub use transport::*;
