pub mod config;
pub mod fallback;
pub mod operations;

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::db::config::{DbConfig, DbConfigError};

/// Long-lived handle to the relational store. Built once at startup and
/// shared through `AppState`; absence of a proxy models the unconfigured
/// degraded mode where reads fall back to defaults.
#[derive(Clone)]
pub struct DatabaseProxy {
    config: DbConfig,
    pool: PgPool,
    health: Arc<RwLock<HealthSnapshot>>,
}

#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
    pub consecutive_failures: u32,
}

impl DatabaseProxy {
    pub async fn from_env() -> Result<Arc<Self>, DbInitError> {
        let config = DbConfig::from_env()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await
            .map_err(DbInitError::Sqlx)?;

        let proxy = Arc::new(Self {
            health: Arc::new(RwLock::new(HealthSnapshot::default())),
            config,
            pool,
        });

        proxy.start_health_monitor();

        Ok(proxy)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_status(&self) -> HealthSnapshot {
        self.health.read().await.clone()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn start_health_monitor(self: &Arc<Self>) {
        let proxy = Arc::clone(self);
        tokio::spawn(async move {
            proxy.health_monitor_loop().await;
        });
    }

    async fn health_monitor_loop(self: Arc<Self>) {
        let interval = self.config.health_check.interval;

        loop {
            let start = tokio::time::Instant::now();
            let result = self.check_health().await;
            {
                let mut snapshot = self.health.write().await;
                match result {
                    Ok(latency) => {
                        snapshot.healthy = true;
                        snapshot.latency_ms = Some(latency.as_millis() as u64);
                        snapshot.error = None;
                        snapshot.consecutive_failures = 0;
                    }
                    Err(message) => {
                        snapshot.healthy = false;
                        snapshot.latency_ms = None;
                        snapshot.consecutive_failures += 1;
                        if snapshot.consecutive_failures == 1 {
                            tracing::warn!(error = %message, "database health check failed");
                        }
                        snapshot.error = Some(message);
                    }
                }
            }

            let elapsed = start.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
    }

    async fn check_health(&self) -> Result<Duration, String> {
        let timeout = self.config.health_check.timeout;
        let started = std::time::Instant::now();
        let result = tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&self.pool)).await;

        match result {
            Ok(Ok(_)) => Ok(started.elapsed()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err("timeout".to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error(transparent)]
    Config(#[from] DbConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
