use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Recommendations
        .route(
            "/recommendations/similar-users",
            get(handlers::similar_users),
        )
        .route(
            "/recommendations/collaborative",
            get(handlers::collaborative),
        )
        .route(
            "/recommendations/discovery-based",
            get(handlers::discovery_based),
        )
        .route(
            "/recommendations/personalized",
            get(handlers::personalized),
        )
        // Behavior tracking
        .route("/behavior/track-view", post(handlers::track_view))
        .route("/behavior/track-like", post(handlers::track_like))
        .route("/behavior/track-search", post(handlers::track_search))
        .route("/behavior/preferences", get(handlers::get_preferences))
}
