pub mod aggregator;
pub mod executor;
pub mod feed;
pub mod providers;
pub mod ranker;

pub use aggregator::Aggregator;
pub use executor::RequestExecutor;
pub use feed::FeedService;
pub use providers::{CatalogProvider, TmdbProvider};
pub use ranker::FreshnessRanker;
