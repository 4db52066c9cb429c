//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analysis::AnalysisService;
use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::Result;

/// Assemble the application router
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .merge(routes::page_routes(state.clone()))
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }
    app
}

/// Start the web UI and JSON API
pub async fn serve_api(
    config: &AppConfig,
    analysis: AnalysisService,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting chanrank web server...");

    let state = AppState {
        analysis,
        config: Arc::new(config.clone()),
    };
    let app = build_router(state, enable_cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Web UI listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET    /                                  - Web UI");
    info!("  POST   /actions/send                      - Web UI: send to Saved Messages");
    info!("  POST   /actions/clear                     - Web UI: clear caches");
    info!("  GET    /api/health                        - Health check");
    info!("  GET    /api/channels                      - Joined channels");
    info!("  GET    /api/channels/:id/ranking          - Ranked messages");
    info!("  GET    /api/channels/:id/report           - Plain-text report");
    info!("  POST   /api/channels/:id/send             - Send to Saved Messages");
    info!("  DELETE /api/channels/:id/cache            - Clear caches");
    info!("  GET    /api/channels/:id/images/:msg      - Cached image");

    axum::serve(listener, app).await?;

    Ok(())
}
