use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::db::DatabaseProxy;

/// Shared application state. Cheap to clone; the proxy is `None` when no
/// DATABASE_URL is configured and the API serves its degraded defaults.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    config: Arc<Config>,
    db_proxy: Option<Arc<DatabaseProxy>>,
}

impl AppState {
    pub fn new(config: Config, db_proxy: Option<Arc<DatabaseProxy>>) -> Self {
        Self {
            started_at: Instant::now(),
            config: Arc::new(config),
            db_proxy,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db_proxy(&self) -> Option<&DatabaseProxy> {
        self.db_proxy.as_deref()
    }
}
