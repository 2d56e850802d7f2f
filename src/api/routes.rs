//! API Routes
//!
//! Configures the Axum router with the article service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_handler, delete_handler, get_handler, health_handler, list_handler, stats_handler,
    update_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /articles` - List latest articles (cached per filter set and language)
/// - `POST /articles` - Create an article
/// - `GET /articles/:id` - Fetch one article
/// - `PUT /articles/:id` - Replace an article
/// - `DELETE /articles/:id` - Delete an article
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/articles", get(list_handler).post(create_handler))
        .route(
            "/articles/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
