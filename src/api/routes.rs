use axum::{http::Method, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET]),
                )
                // Request id must be assigned before the trace span is created.
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog queries
        .route("/titles/search", get(handlers::search))
        .route("/titles/trending", get(handlers::trending))
        .route("/titles/popular", get(handlers::popular))
        .route("/titles/:kind/:id", get(handlers::details))
        .route("/titles/:kind/:id/videos", get(handlers::videos))
        // Aggregated feeds
        .route("/feed/upcoming", get(handlers::upcoming_feed))
        .route("/feed/trailers", get(handlers::trailer_feed))
}
