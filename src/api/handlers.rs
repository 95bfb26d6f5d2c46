use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CatalogEntity, MediaKind, PromotionalVideo, RankedFeedItem},
    services::{executor::CachePolicy, providers::ListQuery, providers::TimeWindow},
};

use super::AppState;

const MAX_FEED_LIMIT: usize = 100;

// Request types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    kind: Option<String>,
    window: Option<TimeWindow>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    limit: Option<usize>,
}

fn parse_kind(kind: &str) -> AppResult<MediaKind> {
    kind.parse().map_err(AppError::InvalidInput)
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

/// Search films and series by name
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogEntity>>> {
    let titles = state.feed.provider().search(&params.q).await?;
    Ok(Json(titles))
}

pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> AppResult<Json<Vec<CatalogEntity>>> {
    let kind = match params.kind.as_deref() {
        None | Some("all") => None,
        Some(kind) => Some(parse_kind(kind)?),
    };
    let query = ListQuery::Trending {
        kind,
        window: params.window.unwrap_or(TimeWindow::Week),
    };

    let titles = state
        .feed
        .provider()
        .list(&query, CachePolicy::Default)
        .await?;
    Ok(Json(titles))
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<CatalogEntity>>> {
    let kind = parse_kind(params.kind.as_deref().unwrap_or("movie"))?;
    let titles = state
        .feed
        .provider()
        .list(&ListQuery::Popular(kind), CachePolicy::Default)
        .await?;
    Ok(Json(titles))
}

/// Details for a single film or series
pub async fn details(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
) -> AppResult<Json<CatalogEntity>> {
    let entity = state.feed.fetch_details(parse_kind(&kind)?, id).await?;
    Ok(Json(entity))
}

pub async fn videos(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
) -> AppResult<Json<Vec<PromotionalVideo>>> {
    let videos = state
        .feed
        .provider()
        .videos(parse_kind(&kind)?, id, CachePolicy::Default)
        .await?;
    Ok(Json(videos))
}

/// Deduplicated upcoming and currently showing titles
pub async fn upcoming_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Vec<CatalogEntity>>> {
    tracing::info!(request_id = %request_id, "Aggregating discovery sources");
    let entities = state.feed.upcoming().await?;
    Ok(Json(entities))
}

/// Titles ordered by their most recently published trailer
pub async fn trailer_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<Vec<RankedFeedItem>>> {
    let limit = params
        .limit
        .unwrap_or_else(|| state.feed.default_max_results())
        .clamp(1, MAX_FEED_LIMIT);

    tracing::info!(request_id = %request_id, limit, "Building trailer feed");

    let items = state.feed.fresh_trailers(limit).await?;

    tracing::info!(request_id = %request_id, items = items.len(), "Trailer feed built");

    Ok(Json(items))
}
