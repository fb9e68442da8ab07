//! HTTP API handlers for songlib-catalog

pub mod error;
pub mod extract;
pub mod health;
pub mod songs;

pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use songs::song_routes;
