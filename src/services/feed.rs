use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CatalogEntity, MediaKind, RankedFeedItem},
    services::{
        aggregator::{default_sources, Aggregator, AggregatorConfig},
        providers::{CatalogProvider, ListQuery},
        ranker::{FreshnessRanker, RankerConfig},
    },
};

/// Caller-facing surface of the catalog client
///
/// The trailer feed is staged: ranking starts only after every discovery source
/// has been joined. Dropping the returned future cancels all in-flight requests
/// of the current stage.
#[derive(Clone)]
pub struct FeedService {
    provider: Arc<dyn CatalogProvider>,
    aggregator: Aggregator,
    ranker: FreshnessRanker,
    sources: Vec<ListQuery>,
}

impl FeedService {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        aggregator_config: AggregatorConfig,
        ranker_config: RankerConfig,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(provider.clone(), aggregator_config),
            ranker: FreshnessRanker::new(provider.clone(), ranker_config),
            provider,
            sources: default_sources(),
        }
    }

    /// Replaces the discovery sources, highest priority first
    pub fn with_sources(mut self, sources: Vec<ListQuery>) -> Self {
        self.sources = sources;
        self
    }

    pub fn provider(&self) -> &Arc<dyn CatalogProvider> {
        &self.provider
    }

    pub fn default_max_results(&self) -> usize {
        self.ranker.config().max_results
    }

    pub async fn aggregate(&self, sources: &[ListQuery]) -> AppResult<Vec<CatalogEntity>> {
        self.aggregator.aggregate(sources).await
    }

    /// Deduplicated entities from the configured discovery sources
    pub async fn upcoming(&self) -> AppResult<Vec<CatalogEntity>> {
        self.aggregate(&self.sources).await
    }

    pub async fn rank_by_freshness(
        &self,
        entities: Vec<CatalogEntity>,
        max_results: usize,
    ) -> Vec<RankedFeedItem> {
        self.ranker.rank_by_freshness(entities, max_results).await
    }

    /// Most recently promoted titles across the configured discovery sources
    pub async fn fresh_trailers(&self, max_results: usize) -> AppResult<Vec<RankedFeedItem>> {
        let entities = self.upcoming().await?;
        Ok(self.rank_by_freshness(entities, max_results).await)
    }

    pub async fn fetch_details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogEntity> {
        self.provider.details(kind, id).await
    }
}
