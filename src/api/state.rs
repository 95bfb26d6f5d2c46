use std::sync::Arc;

use crate::services::FeedService;

/// Shared application state
///
/// Holds no mutable data: every request is served by a fresh pipeline run.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
}

impl AppState {
    pub fn new(feed: FeedService) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }
}
