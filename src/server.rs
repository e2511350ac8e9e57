use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{self, ApiState};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::store::{JobStore, MemoryStore};

/// Owns the job store for the lifetime of the API server.
pub struct Server {
    pub config: ServerConfig,
    pub store: Arc<dyn JobStore>,
}

impl Server {
    /// Open the job store described by `config`.
    pub async fn open(config: ServerConfig) -> Result<Self> {
        let store = MemoryStore::open(&config.store).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn JobStore>) -> Self {
        Self { config, store }
    }

    /// Run the API server until `shutdown` is cancelled, then close the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound, the server fails, or
    /// the store cannot be flushed on close. The store is closed even when the
    /// server itself failed.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let state = ApiState::new(self.store.clone());
        let served = api::run_api(self.config.listen_addr, state, shutdown).await;

        tracing::info!("API server stopped, closing job store");
        let closed = self.store.close().await;

        served?;
        closed
    }
}
