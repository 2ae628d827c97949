//! # Domain Layer
//!
//! Chat messages, completions, transcripts and the error taxonomy.
//! This layer is independent of HTTP frameworks and the upstream provider.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
