/// TMDB v3 provider
///
/// Maps catalog operations onto TMDB endpoints. All network traffic, retries and
/// credentials are handled by the [`RequestExecutor`].
///
/// Endpoints used:
/// - `/search/multi`, `/trending/{kind|all}/{window}`
/// - `/{kind}/popular`, `/{kind}/top_rated`
/// - `/movie/upcoming`, `/movie/now_playing`, `/tv/on_the_air`, `/tv/airing_today`
/// - `/discover/{kind}` for release windows
/// - `/{kind}/{id}` and `/{kind}/{id}/videos`
use chrono::{Days, NaiveDate, Utc};
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{
        tmdb::{decode_list_item, decode_video, TmdbPage, TmdbTitle, TmdbVideos},
        CatalogEntity, MediaKind, PromotionalVideo,
    },
    services::{
        executor::{CachePolicy, Endpoint, RequestExecutor},
        providers::{CatalogProvider, ListQuery},
    },
};

#[derive(Clone)]
pub struct TmdbProvider {
    executor: RequestExecutor,
}

impl TmdbProvider {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Resolves a list query to its endpoint, relative to `today`
    fn list_endpoint(query: &ListQuery, today: NaiveDate) -> Endpoint {
        match query {
            ListQuery::Trending { kind, window } => Endpoint::new(format!(
                "/trending/{}/{}",
                kind.map(|k| k.as_path()).unwrap_or("all"),
                window.as_path()
            )),
            ListQuery::Popular(kind) => Endpoint::new(format!("/{}/popular", kind.as_path())),
            ListQuery::TopRated(kind) => Endpoint::new(format!("/{}/top_rated", kind.as_path())),
            ListQuery::Upcoming => Endpoint::new("/movie/upcoming"),
            ListQuery::NowPlaying => Endpoint::new("/movie/now_playing"),
            ListQuery::OnTheAir => Endpoint::new("/tv/on_the_air"),
            ListQuery::AiringToday => Endpoint::new("/tv/airing_today"),
            ListQuery::ReleaseWindow {
                kind,
                from_days,
                to_days,
            } => {
                let date_field = match kind {
                    MediaKind::Movie => "primary_release_date",
                    MediaKind::Tv => "first_air_date",
                };
                let from = today
                    .checked_add_days(Days::new(u64::from(*from_days)))
                    .unwrap_or(today);
                let to = today
                    .checked_add_days(Days::new(u64::from(*to_days)))
                    .unwrap_or(from);

                Endpoint::new(format!("/discover/{}", kind.as_path()))
                    .param("sort_by", "popularity.desc")
                    .param(&format!("{}.gte", date_field), from.format("%Y-%m-%d"))
                    .param(&format!("{}.lte", date_field), to.format("%Y-%m-%d"))
            }
        }
    }

    fn decode_page(
        value: serde_json::Value,
        kind: Option<MediaKind>,
        endpoint: &str,
    ) -> AppResult<Vec<CatalogEntity>> {
        let page: TmdbPage = serde_json::from_value(value).map_err(|e| {
            AppError::InvalidResponse(format!("{}: unexpected list shape: {}", endpoint, e))
        })?;

        let total = page.results.len();
        let entities: Vec<CatalogEntity> = page
            .results
            .into_iter()
            .filter_map(|item| decode_list_item(item, kind))
            .collect();

        if entities.len() < total {
            tracing::debug!(
                endpoint = %endpoint,
                skipped = total - entities.len(),
                "Dropped undecodable list items"
            );
        }

        Ok(entities)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntity>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let endpoint = Endpoint::new("/search/multi")
            .param("query", query.trim())
            .param("include_adult", "false");
        let value = self.executor.execute(&endpoint, CachePolicy::Default).await?;
        let entities = Self::decode_page(value, None, &endpoint.path)?;

        tracing::info!(
            query = %query,
            results = entities.len(),
            provider = self.name(),
            "Title search completed"
        );

        Ok(entities)
    }

    #[instrument(skip(self), fields(source = %query))]
    async fn list(&self, query: &ListQuery, cache: CachePolicy) -> AppResult<Vec<CatalogEntity>> {
        let endpoint = Self::list_endpoint(query, Utc::now().date_naive());
        let value = self.executor.execute(&endpoint, cache).await?;
        let entities = Self::decode_page(value, query.kind(), &endpoint.path)?;

        tracing::debug!(
            results = entities.len(),
            provider = self.name(),
            "Discovery list fetched"
        );

        Ok(entities)
    }

    #[instrument(skip(self))]
    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogEntity> {
        let endpoint = Endpoint::new(format!("/{}/{}", kind.as_path(), id));
        let value = self.executor.execute(&endpoint, CachePolicy::Default).await?;

        let title: TmdbTitle = serde_json::from_value(value).map_err(|e| {
            AppError::InvalidResponse(format!("{}: unexpected details shape: {}", endpoint.path, e))
        })?;

        title.into_entity(kind).ok_or_else(|| {
            AppError::InvalidResponse(format!("{}: details missing a title", endpoint.path))
        })
    }

    #[instrument(skip(self))]
    async fn videos(
        &self,
        kind: MediaKind,
        id: u64,
        cache: CachePolicy,
    ) -> AppResult<Vec<PromotionalVideo>> {
        let endpoint = Endpoint::new(format!("/{}/{}/videos", kind.as_path(), id));
        let value = self.executor.execute(&endpoint, cache).await?;

        let videos: TmdbVideos = serde_json::from_value(value).map_err(|e| {
            AppError::InvalidResponse(format!("{}: unexpected videos shape: {}", endpoint.path, e))
        })?;

        Ok(videos.results.into_iter().filter_map(decode_video).collect())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
