/// Freshness ranking of catalog entities by their promotional videos
///
/// For every entity the ranker fetches its video list, picks one representative
/// video (site and type filter, Trailer before Teaser, official before unofficial,
/// newest first) and orders entities by that video's publish time, newest first.
/// Entities without a usable video are dropped from the feed, never given a
/// default timestamp.
use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::{
    models::{CatalogEntity, PromotionalVideo, RankedFeedItem, VideoType},
    services::{executor::CachePolicy, providers::CatalogProvider},
};

#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Hosting site a video must be on to be eligible
    pub eligible_site: String,
    pub max_results: usize,
    pub max_concurrent_requests: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            eligible_site: "YouTube".to_string(),
            max_results: 24,
            max_concurrent_requests: 16,
        }
    }
}

/// Why an entity was left out of the ranked feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoEligibleVideo {
    FetchFailed,
    NoMatchingVideo,
    NoTimestamp,
}

/// Three-valued freshness comparison
///
/// A present timestamp is fresher than an absent one; two absent timestamps are
/// unordered (`None`).
pub fn compare_freshness(
    a: Option<&DateTime<Utc>>,
    b: Option<&DateTime<Utc>>,
) -> Option<Ordering> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.cmp(b)),
        (Some(_), None) => Some(Ordering::Greater),
        (None, Some(_)) => Some(Ordering::Less),
        (None, None) => None,
    }
}

/// Picks the video that represents an entity's freshness
pub fn select_candidate<'a>(
    videos: &'a [PromotionalVideo],
    eligible_site: &str,
) -> Result<(&'a PromotionalVideo, DateTime<Utc>), NoEligibleVideo> {
    let on_site = |video_type: VideoType| -> Vec<&'a PromotionalVideo> {
        videos
            .iter()
            .filter(|v| v.site == eligible_site && v.video_type == video_type)
            .collect()
    };

    let mut candidates = on_site(VideoType::Trailer);
    if candidates.is_empty() {
        candidates = on_site(VideoType::Teaser);
    }
    if candidates.is_empty() {
        return Err(NoEligibleVideo::NoMatchingVideo);
    }

    if candidates.iter().any(|v| v.official == Some(true)) {
        candidates.retain(|v| v.official == Some(true));
    }

    // Strictly-greater replacement keeps the earliest of equally fresh candidates.
    let mut best: Option<&PromotionalVideo> = None;
    for candidate in candidates {
        let fresher = match best {
            None => true,
            Some(current) => {
                compare_freshness(
                    candidate.published_at.as_ref(),
                    current.published_at.as_ref(),
                ) == Some(Ordering::Greater)
            }
        };
        if fresher {
            best = Some(candidate);
        }
    }

    best.and_then(|video| video.published_at.map(|ts| (video, ts)))
        .ok_or(NoEligibleVideo::NoTimestamp)
}

/// Orders items newest first; equal timestamps keep their input order
pub fn sort_by_freshness(items: &mut [RankedFeedItem]) {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

#[derive(Clone)]
pub struct FreshnessRanker {
    provider: Arc<dyn CatalogProvider>,
    config: RankerConfig,
}

impl FreshnessRanker {
    pub fn new(provider: Arc<dyn CatalogProvider>, config: RankerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Ranks entities by their freshest eligible video
    ///
    /// Returns at most `max_results` items. Video fetch failures only exclude the
    /// affected entity.
    pub async fn rank_by_freshness(
        &self,
        entities: Vec<CatalogEntity>,
        max_results: usize,
    ) -> Vec<RankedFeedItem> {
        let input_count = entities.len();

        // `buffered` yields results in input order, so every entity keeps its slot.
        let fetched: Vec<_> = stream::iter(entities)
            .map(|entity| async move {
                let videos = self
                    .provider
                    .videos(entity.kind, entity.id, CachePolicy::Bypass)
                    .await;
                (entity, videos)
            })
            .buffered(self.config.max_concurrent_requests.max(1))
            .collect()
            .await;

        let mut items = Vec::with_capacity(fetched.len());
        for (entity, videos) in fetched {
            let selection = match &videos {
                Ok(videos) => select_candidate(videos, &self.config.eligible_site)
                    .map(|(video, ts)| (video.clone(), ts)),
                Err(error) => {
                    tracing::warn!(
                        entity = %entity.key(),
                        error = %error,
                        "Video fetch failed, excluding entity"
                    );
                    Err(NoEligibleVideo::FetchFailed)
                }
            };

            match selection {
                Ok((video, published_at)) => {
                    items.push(RankedFeedItem::new(entity, video, published_at))
                }
                Err(reason) => {
                    tracing::debug!(entity = %entity.key(), reason = ?reason, "Entity not ranked");
                }
            }
        }

        let eligible = items.len();
        sort_by_freshness(&mut items);
        items.truncate(max_results);

        tracing::info!(
            input = input_count,
            eligible,
            returned = items.len(),
            "Freshness ranking completed"
        );

        items
    }
}
