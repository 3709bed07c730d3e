//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use tubely_core::{Config, StorageBackend};
use tubely_storage::{create_local_storage, create_storage, LocalStorage, Storage};

/// Storage handles built at startup.
pub struct StorageSetup {
    pub storage: Arc<dyn Storage>,
    /// The same backend as `storage` when it is local; the media route serves from it.
    pub local_media: Option<Arc<LocalStorage>>,
}

pub async fn setup_storage(config: &Config) -> Result<StorageSetup> {
    tracing::info!("Initializing storage abstraction...");

    let setup = match config.storage_backend {
        StorageBackend::Local => {
            let local = create_local_storage(config).await?;
            let storage: Arc<dyn Storage> = local.clone();
            StorageSetup {
                storage,
                local_media: Some(local),
            }
        }
        StorageBackend::S3 => StorageSetup {
            storage: create_storage(config).await?,
            local_media: None,
        },
    };

    tracing::info!(
        backend = %setup.storage.backend_type(),
        bucket = %setup.storage.default_bucket(),
        "Storage abstraction initialized successfully"
    );

    Ok(setup)
}
