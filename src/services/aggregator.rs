use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::{
    error::{AppError, AppResult, SourceFailure},
    models::{CatalogEntity, EntityKey, MediaKind},
    services::{
        executor::CachePolicy,
        providers::{CatalogProvider, ListQuery},
    },
};

/// Per-kind truncation applied to every source before merging
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub per_source_limit: HashMap<MediaKind, usize>,
    /// Sources queried at the same time
    pub max_concurrent_requests: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            per_source_limit: [(MediaKind::Movie, 30), (MediaKind::Tv, 15)]
                .into_iter()
                .collect(),
            max_concurrent_requests: 16,
        }
    }
}

impl AggregatorConfig {
    pub fn limit_for(&self, kind: MediaKind) -> usize {
        self.per_source_limit.get(&kind).copied().unwrap_or(0)
    }
}

/// The default discovery sources, highest priority first
pub fn default_sources() -> Vec<ListQuery> {
    vec![
        ListQuery::ReleaseWindow {
            kind: MediaKind::Movie,
            from_days: 0,
            to_days: 30,
        },
        ListQuery::ReleaseWindow {
            kind: MediaKind::Movie,
            from_days: 31,
            to_days: 90,
        },
        ListQuery::NowPlaying,
        ListQuery::OnTheAir,
        ListQuery::ReleaseWindow {
            kind: MediaKind::Tv,
            from_days: 0,
            to_days: 60,
        },
    ]
}

/// Fans discovery queries out concurrently and merges them into one
/// deduplicated list
#[derive(Clone)]
pub struct Aggregator {
    provider: Arc<dyn CatalogProvider>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn CatalogProvider>, config: AggregatorConfig) -> Self {
        Self { provider, config }
    }

    /// Queries every source, tolerating individual failures
    ///
    /// Output order is first-seen order across `sources` in the given priority;
    /// completion order of the requests never matters. Fails with
    /// [`AppError::AggregationFailed`] only when every source failed.
    pub async fn aggregate(&self, sources: &[ListQuery]) -> AppResult<Vec<CatalogEntity>> {
        let requests: Vec<_> = sources
            .iter()
            .map(|source| self.provider.list(source, CachePolicy::Bypass))
            .collect();
        let results: Vec<_> = stream::iter(requests)
            .buffered(self.config.max_concurrent_requests.max(1))
            .collect()
            .await;

        let mut lists = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();

        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(entities) => lists.push(self.truncate(entities)),
                Err(error) => {
                    tracing::error!(
                        source = %source,
                        provider = self.provider.name(),
                        error = %error,
                        "Discovery source failed"
                    );
                    failures.push(SourceFailure {
                        source: source.to_string(),
                        error,
                    });
                }
            }
        }

        if lists.is_empty() && !failures.is_empty() {
            return Err(AppError::AggregationFailed(failures));
        }

        let merged = merge_unique(lists);

        if failures.is_empty() {
            tracing::info!(
                sources = sources.len(),
                entities = merged.len(),
                "Aggregation completed"
            );
        } else {
            tracing::warn!(
                success_count = sources.len() - failures.len(),
                error_count = failures.len(),
                entities = merged.len(),
                "Partial aggregation failure"
            );
        }

        Ok(merged)
    }

    /// Keeps the first `limit_for(kind)` entities of each kind, in order
    fn truncate(&self, entities: Vec<CatalogEntity>) -> Vec<CatalogEntity> {
        let mut taken: HashMap<MediaKind, usize> = HashMap::new();
        entities
            .into_iter()
            .filter(|entity| {
                let count = taken.entry(entity.kind).or_insert(0);
                if *count < self.config.limit_for(entity.kind) {
                    *count += 1;
                    true
                } else {
                    false
                }
            })
            .collect()
    }
}

/// First-seen-wins merge keyed by `(kind, id)`
pub fn merge_unique<I>(lists: I) -> Vec<CatalogEntity>
where
    I: IntoIterator<Item = Vec<CatalogEntity>>,
{
    let mut seen: HashSet<EntityKey> = HashSet::new();
    let mut merged = Vec::new();

    for entity in lists.into_iter().flatten() {
        if seen.insert(entity.key()) {
            merged.push(entity);
        }
    }

    merged
}
