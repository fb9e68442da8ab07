//! songlib-catalog library - Song catalog service
//!
//! Accepts group/title pairs, enriches them from a metadata provider,
//! persists the result and serves filtered listings and paged lyrics.

use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod enrichment;
pub mod error;
pub mod filter;
pub mod models;
pub mod service;
pub mod store;
pub mod verses;

pub use error::{CatalogError, CatalogResult};
pub use service::{CatalogService, OpContext};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
    /// Cancelled on shutdown; each request runs under a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: CatalogService, shutdown: CancellationToken) -> Self {
        Self {
            service: Arc::new(service),
            shutdown,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
