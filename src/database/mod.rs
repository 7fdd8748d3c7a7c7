pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{StoreError, TowerStore};

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;

/// Pick the backing store: Postgres when `DATABASE_URL` is configured,
/// otherwise a process-local map.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn TowerStore>, StoreError> {
    match config.database.url {
        Some(_) => {
            let store = PgStore::connect(&config.database).await?;
            Ok(Arc::new(store))
        }
        None => {
            if config.environment == crate::config::Environment::Production {
                warn!("DATABASE_URL not set in production; towers will not survive a restart");
            }
            info!("Using in-memory tower store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
