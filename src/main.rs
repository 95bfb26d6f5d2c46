use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_feed::{
    api::{create_router, AppState},
    config::Config,
    services::{FeedService, RequestExecutor, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_feed=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let executor = RequestExecutor::from_config(&config.executor())?;
    let provider = Arc::new(TmdbProvider::new(executor));
    let feed = FeedService::new(provider, config.aggregator(), config.ranker());

    let app = create_router(AppState::new(feed));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
