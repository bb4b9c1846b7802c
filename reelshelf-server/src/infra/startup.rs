use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::infra::app_state::AppState;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Work that runs once the state is built and before the listener opens.
#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

#[derive(Debug)]
pub struct ProdStartupHooks {
    purge_interval: Duration,
}

impl Default for ProdStartupHooks {
    fn default() -> Self {
        Self {
            purge_interval: SESSION_PURGE_INTERVAL,
        }
    }
}

impl ProdStartupHooks {
    pub fn with_purge_interval(purge_interval: Duration) -> Self {
        Self { purge_interval }
    }
}

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        if state.config.catalog.tmdb.api_key.is_none() {
            warn!("TMDB is not configured; movie endpoints will report errors");
        }

        let auth = state.auth_service.clone();
        let period = self.purge_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match auth.purge_expired_sessions().await {
                    Ok(0) => debug!("no expired sessions"),
                    Ok(purged) => info!(purged, "purged expired sessions"),
                    Err(err) => {
                        warn!(error = %err, "failed to purge expired sessions")
                    }
                }
            }
        });

        Ok(())
    }
}
