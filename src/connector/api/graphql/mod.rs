mod executor;
mod schema;

pub use executor::{execute, GraphQlRequest};
pub use schema::{
    build_schema, ChatInput, ChatResponse, MessageInput, RelaySchema, HELLO_GREETING, MAX_NESTING,
};
