//! API route definitions

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Channel endpoints
        .route("/channels", get(handlers::list_channels))
        .route("/channels/:id/ranking", get(handlers::get_ranking))
        .route("/channels/:id/report", get(handlers::download_report))
        .route("/channels/:id/send", post(handlers::send_ranking))
        .route("/channels/:id/cache", delete(handlers::clear_cache))
        .route("/channels/:id/images/:message_id", get(handlers::get_image))
        .with_state(state)
}

/// HTML front end
pub fn page_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/actions/send", post(handlers::send_action))
        .route("/actions/clear", post(handlers::clear_action))
        .with_state(state)
}
