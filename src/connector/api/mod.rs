pub mod container;
pub mod controller;
pub mod cors;
pub mod error_response;
pub mod graphql;
pub mod router;

pub use container::{Container, ContainerConfig};
pub use error_response::{ApiError, ErrorFlavor};
pub use router::{router, serve};
