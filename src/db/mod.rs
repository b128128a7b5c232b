pub mod memory;
pub mod mongo;
pub mod store;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Config, DbType};
use memory::MemoryLinkStore;
use mongo::{MongoLinkStore, get_database};
use store::LinkStore;

/// Build the storage backend named by the configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn LinkStore>> {
    match config.db_type {
        DbType::MongoDb => {
            let uri = config
                .database_url
                .as_deref()
                .context("MONGODB_URI not set")?;
            let db = get_database(uri, &config.database_name)
                .await
                .context("Failed to connect to MongoDB")?;
            log::info!("MongoDB connected, database '{}'", config.database_name);
            let store = MongoLinkStore::new(db)
                .await
                .context("Failed to prepare the qrcodes collection")?;
            Ok(Arc::new(store))
        }
        DbType::Memory => {
            log::warn!("Using the in-memory store, links are lost on restart");
            Ok(Arc::new(MemoryLinkStore::new()))
        }
    }
}
