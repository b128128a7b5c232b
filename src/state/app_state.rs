use std::sync::Arc;

use crate::config::Config;
use crate::db::store::LinkStore;
use crate::services::tracker::RedirectTracker;
use crate::state::response_cache::ResponseCache;

pub struct AppState {
    pub store: Arc<dyn LinkStore>,
    pub tracker: RedirectTracker,
    pub cache: Arc<ResponseCache>,
    pub config: Config,
    pub started_at: i64, // epoch milliseconds
}

impl AppState {
    pub fn new(store: Arc<dyn LinkStore>, cache: Arc<ResponseCache>, config: Config) -> Self {
        Self {
            tracker: RedirectTracker::new(Arc::clone(&store)),
            store,
            cache,
            config,
            started_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
