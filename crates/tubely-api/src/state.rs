//! Application state shared by all handlers.

use std::sync::Arc;

use tubely_core::StorageBackend;
use tubely_db::VideoStore;
use tubely_storage::LocalStorage;

use crate::services::{LinkSigner, VideoUploadService};

#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoStore>,
    pub upload: VideoUploadService,
    pub links: LinkSigner,
    /// Present only with the local backend, which serves its own signed links.
    pub local_media: Option<Arc<LocalStorage>>,
    pub storage_backend: StorageBackend,
}

impl AppState {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        upload: VideoUploadService,
        links: LinkSigner,
        local_media: Option<Arc<LocalStorage>>,
        storage_backend: StorageBackend,
    ) -> Self {
        Self {
            videos,
            upload,
            links,
            local_media,
            storage_backend,
        }
    }
}
