pub mod memory;
pub mod spanner;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StoreBackend};

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

/// Flat string keyspace the handlers read and write records through
///
/// Each call is atomic on its own. Nothing ties a `get` to a later `put`,
/// so a read-modify-write done by a caller can lose a concurrent update.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing whatever was there
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Build the backend selected by `STORE_BACKEND`
pub async fn from_config(config: &Config) -> Result<SharedStore> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Spanner => {
            let spanner = config
                .spanner
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Spanner backend selected without Spanner config"))?;
            Ok(Arc::new(SpannerStore::from_config(spanner).await?))
        }
    }
}
