//! # Application Layer
//!
//! Use cases coordinating the domain with the upstream provider (proxy side)
//! and with the proxy transports (client side).

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
