//! HTTP interface for the delivery dashboard
//!
//! Serves the dashboard page plus a small JSON API over the same data.

pub mod handlers;
pub mod service;

pub use service::DashboardService;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(service: Arc<DashboardService>) -> Router {
    let body_limit = service.config().max_upload_bytes;

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/predict", post(handlers::predict_manual))
        // JSON API
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/kpis", get(handlers::get_kpis))
        .route("/api/v1/metrics/:dimension", get(handlers::get_metrics))
        .route("/api/v1/features", get(handlers::get_features))
        .route("/api/v1/predict", post(handlers::predict))
        .route("/api/v1/predict/batch", post(handlers::predict_batch))
        // State and middleware
        .with_state(service)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
