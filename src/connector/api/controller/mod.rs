pub mod chat_controller;
pub mod fallback_controller;
pub mod graphql_controller;
pub mod health_controller;

pub use chat_controller::{chat, chat_method_not_allowed};
pub use fallback_controller::not_found;
pub use graphql_controller::{graphql, graphql_method_not_allowed};
pub use health_controller::{health, health_method_not_allowed};
