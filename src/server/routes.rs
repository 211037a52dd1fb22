//! Router setup with routes and middleware

use crate::context::AppContext;
use crate::server::handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the axum Router with all routes and middleware.
///
/// CORS is fully permissive so a frontend on any origin can call the API.
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/chat/realtime", post(handlers::chat_realtime))
        .route("/chat/history/{session_id}", get(handlers::history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
