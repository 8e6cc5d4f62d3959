//! service-core: shared HTTP service infrastructure (config, errors,
//! middleware, observability) for the inference stack.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
