/// Catalog data provider abstraction
///
/// Named catalog operations (search, discovery lists, details, videos) that map onto
/// upstream endpoints. The aggregator and ranker only see this trait, so tests can
/// script catalog answers without any HTTP involved.
use std::fmt::Display;

use crate::{
    error::AppResult,
    models::{CatalogEntity, MediaKind, PromotionalVideo},
    services::executor::CachePolicy,
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_path(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// A discovery list the catalog can answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// `kind: None` mixes films and series
    Trending {
        kind: Option<MediaKind>,
        window: TimeWindow,
    },
    Popular(MediaKind),
    TopRated(MediaKind),
    /// Films announced as upcoming by the catalog
    Upcoming,
    /// Films currently in theatres
    NowPlaying,
    /// Series with an episode airing in the next week
    OnTheAir,
    AiringToday,
    /// Titles releasing (films) or premiering (series) between
    /// `today + from_days` and `today + to_days`, most popular first
    ReleaseWindow {
        kind: MediaKind,
        from_days: u32,
        to_days: u32,
    },
}

impl ListQuery {
    /// Kind of every entity in the result, if the list is single-kind
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            ListQuery::Trending { kind, .. } => *kind,
            ListQuery::Popular(kind) | ListQuery::TopRated(kind) => Some(*kind),
            ListQuery::Upcoming | ListQuery::NowPlaying => Some(MediaKind::Movie),
            ListQuery::OnTheAir | ListQuery::AiringToday => Some(MediaKind::Tv),
            ListQuery::ReleaseWindow { kind, .. } => Some(*kind),
        }
    }
}

impl Display for ListQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListQuery::Trending { kind, window } => match kind {
                Some(kind) => write!(f, "trending_{}_{}", kind, window.as_path()),
                None => write!(f, "trending_all_{}", window.as_path()),
            },
            ListQuery::Popular(kind) => write!(f, "popular_{}", kind),
            ListQuery::TopRated(kind) => write!(f, "top_rated_{}", kind),
            ListQuery::Upcoming => write!(f, "upcoming_movie"),
            ListQuery::NowPlaying => write!(f, "now_playing_movie"),
            ListQuery::OnTheAir => write!(f, "on_the_air_tv"),
            ListQuery::AiringToday => write!(f, "airing_today_tv"),
            ListQuery::ReleaseWindow {
                kind,
                from_days,
                to_days,
            } => write!(f, "release_window_{}_{}d_{}d", kind, from_days, to_days),
        }
    }
}

/// Trait for catalog data providers
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search films and series by name
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntity>>;

    /// Fetch one discovery list. Undecodable items are dropped, not reported.
    async fn list(&self, query: &ListQuery, cache: CachePolicy) -> AppResult<Vec<CatalogEntity>>;

    /// Fetch a single entity
    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogEntity>;

    /// Fetch the promotional videos attached to an entity
    async fn videos(
        &self,
        kind: MediaKind,
        id: u64,
        cache: CachePolicy,
    ) -> AppResult<Vec<PromotionalVideo>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
