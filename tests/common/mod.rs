#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use catalog_feed::{
    error::{AppError, AppResult, AttemptError},
    models::{CatalogEntity, MediaKind, PromotionalVideo, VideoType},
    services::{executor::CachePolicy, providers::ListQuery, CatalogProvider},
};

pub fn entity(kind: MediaKind, id: u64, title: &str) -> CatalogEntity {
    CatalogEntity {
        kind,
        id,
        title: title.to_string(),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        popularity: 1.0,
        vote_average: None,
        release_date: None,
    }
}

pub fn movies(ids: std::ops::RangeInclusive<u64>) -> Vec<CatalogEntity> {
    ids.map(|id| entity(MediaKind::Movie, id, &format!("Movie {}", id)))
        .collect()
}

pub fn series(ids: std::ops::RangeInclusive<u64>) -> Vec<CatalogEntity> {
    ids.map(|id| entity(MediaKind::Tv, id, &format!("Series {}", id)))
        .collect()
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

pub fn trailer(key: &str, official: Option<bool>, published_at: Option<DateTime<Utc>>) -> PromotionalVideo {
    video(key, "YouTube", VideoType::Trailer, official, published_at)
}

pub fn video(
    key: &str,
    site: &str,
    video_type: VideoType,
    official: Option<bool>,
    published_at: Option<DateTime<Utc>>,
) -> PromotionalVideo {
    PromotionalVideo {
        key: key.to_string(),
        name: format!("{} video", key),
        site: site.to_string(),
        video_type,
        official,
        published_at,
    }
}

fn exhausted(what: String) -> AppError {
    AppError::UpstreamUnavailable {
        endpoint: what,
        attempts: 3,
        last: AttemptError::UpstreamError {
            status: 503,
            body: "Service Unavailable".to_string(),
        },
    }
}

/// In-memory catalog answering from fixed tables. Lists and video lists that
/// are not scripted fail as if the upstream were down after retries.
#[derive(Default)]
pub struct ScriptedCatalog {
    lists: HashMap<String, Vec<CatalogEntity>>,
    videos: HashMap<(MediaKind, u64), Vec<PromotionalVideo>>,
    video_delays: HashMap<(MediaKind, u64), Duration>,
    details: HashMap<(MediaKind, u64), CatalogEntity>,
    pub list_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, query: ListQuery, entities: Vec<CatalogEntity>) -> Self {
        self.lists.insert(query.to_string(), entities);
        self
    }

    pub fn with_videos(mut self, kind: MediaKind, id: u64, videos: Vec<PromotionalVideo>) -> Self {
        self.videos.insert((kind, id), videos);
        self
    }

    /// Makes the video fetch for one entity complete only after `delay`
    pub fn with_video_delay(mut self, kind: MediaKind, id: u64, delay: Duration) -> Self {
        self.video_delays.insert((kind, id), delay);
        self
    }

    pub fn with_details(mut self, entity: CatalogEntity) -> Self {
        self.details.insert((entity.kind, entity.id), entity);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for ScriptedCatalog {
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntity>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        let needle = query.to_lowercase();
        Ok(self
            .details
            .values()
            .filter(|e| e.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list(&self, query: &ListQuery, _cache: CachePolicy) -> AppResult<Vec<CatalogEntity>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.lists
            .get(&query.to_string())
            .cloned()
            .ok_or_else(|| exhausted(query.to_string()))
    }

    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogEntity> {
        self.details
            .get(&(kind, id))
            .cloned()
            .ok_or_else(|| exhausted(format!("/{}/{}", kind, id)))
    }

    async fn videos(
        &self,
        kind: MediaKind,
        id: u64,
        _cache: CachePolicy,
    ) -> AppResult<Vec<PromotionalVideo>> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.video_delays.get(&(kind, id)) {
            tokio::time::sleep(*delay).await;
        }
        self.videos
            .get(&(kind, id))
            .cloned()
            .ok_or_else(|| exhausted(format!("/{}/{}/videos", kind, id)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
