use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;

/// Process-wide shared state: the live configuration and the database
/// handle. Everything else hangs off the service layer.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
