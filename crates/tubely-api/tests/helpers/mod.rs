//! Shared fixtures for the API integration tests.
//!
//! The app runs against an in-memory metadata store, the real local storage backend in a
//! temp directory, and stub media tools, so no database or ffmpeg install is needed.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::auth::issue_access_token;
use tubely_api::setup::routes::setup_routes;
use tubely_api::{AppState, LinkSigner, VideoUploadService};
use tubely_core::constants::MAX_UPLOAD_SIZE_BYTES;
use tubely_core::{Config, StorageBackend, StorageReference, VideoRecord};
use tubely_processing::{MediaProber, MediaRemuxer, TempStage, VideoGeometry};
use tubely_storage::{LocalStorage, Storage};
use uuid::Uuid;

use fakes::{CopyRemuxer, InMemoryVideoStore, StaticProber};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters";
pub const TEST_SIGNING_SECRET: &str = "test-media-signing-secret-32-chars!";
pub const TEST_BUCKET: &str = "tubely";
pub const MEDIA_BASE_URL: &str = "http://localhost:8091/media";

/// Collaborator overrides for one test app.
pub struct AppOptions {
    pub prober: Arc<dyn MediaProber>,
    pub remuxer: Arc<dyn MediaRemuxer>,
    /// Replaces the local backend for uploads and signing when set.
    pub storage: Option<Arc<dyn Storage>>,
    /// Wraps the local backend instead of replacing it, e.g. to break signing only.
    pub wrap_storage: Option<fn(Arc<dyn Storage>) -> Arc<dyn Storage>>,
    pub max_upload_bytes: u64,
    /// Metadata store shared with collaborators that need to reach it.
    pub videos: Arc<InMemoryVideoStore>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            prober: Arc::new(StaticProber(VideoGeometry::new(1920, 1080, Some("16:9")))),
            remuxer: Arc::new(CopyRemuxer),
            storage: None,
            wrap_storage: None,
            max_upload_bytes: MAX_UPLOAD_SIZE_BYTES,
            videos: Arc::new(InMemoryVideoStore::default()),
        }
    }
}

/// Test application: server plus the handles tests inspect.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoStore>,
    pub media: Arc<LocalStorage>,
    storage_dir: TempDir,
    stage_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Root of the local object store.
    pub fn objects_dir(&self) -> PathBuf {
        self.storage_dir.path().join("objects")
    }

    pub fn object_path(&self, key: &str) -> PathBuf {
        self.objects_dir().join(TEST_BUCKET).join(key)
    }

    /// Number of files left in the upload staging directory.
    pub fn staged_files(&self) -> usize {
        count_entries(self.stage_dir.path())
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(AppOptions::default()).await
}

pub async fn setup_test_app_with(options: AppOptions) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create storage directory");
    let stage_dir = tempfile::tempdir().expect("Failed to create staging directory");

    let media = Arc::new(
        LocalStorage::new(
            storage_dir.path().join("objects"),
            MEDIA_BASE_URL.to_string(),
            TEST_BUCKET.to_string(),
            TEST_SIGNING_SECRET,
        )
        .await
        .expect("Failed to create local storage"),
    );
    let storage = options
        .storage
        .unwrap_or_else(|| -> Arc<dyn Storage> { media.clone() });
    let storage = match options.wrap_storage {
        Some(wrap) => wrap(storage),
        None => storage,
    };

    let videos = options.videos;
    let upload = VideoUploadService::new(
        videos.clone(),
        storage.clone(),
        options.prober,
        options.remuxer,
        TempStage::new(stage_dir.path(), options.max_upload_bytes),
    );
    let state = Arc::new(AppState::new(
        videos.clone(),
        upload,
        LinkSigner::new(storage),
        Some(media.clone()),
        StorageBackend::Local,
    ));

    let config = create_test_config(storage_dir.path(), stage_dir.path());
    let app = setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        videos,
        media,
        storage_dir,
        stage_dir,
    }
}

fn create_test_config(storage_dir: &Path, stage_dir: &Path) -> Config {
    Config {
        server_port: 8091,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database_url: "postgres://localhost/tubely_test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: Some(storage_dir.join("objects").display().to_string()),
        local_storage_base_url: Some(MEDIA_BASE_URL.to_string()),
        local_storage_bucket: TEST_BUCKET.to_string(),
        local_storage_signing_secret: Some(TEST_SIGNING_SECRET.to_string()),
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        upload_temp_dir: stage_dir.to_path_buf(),
    }
}

pub fn token_for(user_id: Uuid) -> String {
    issue_access_token(user_id, TEST_JWT_SECRET, Duration::from_secs(3600))
        .expect("Failed to issue test token")
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}

/// Insert a record owned by `user_id`, optionally already pointing at an object.
pub fn seed_video(app: &TestApp, user_id: Uuid, reference: Option<&StorageReference>) -> VideoRecord {
    seed_video_with_id(app, Uuid::new_v4(), user_id, reference)
}

pub fn seed_video_with_id(
    app: &TestApp,
    id: Uuid,
    user_id: Uuid,
    reference: Option<&StorageReference>,
) -> VideoRecord {
    let now = Utc::now();
    let video = VideoRecord {
        id,
        user_id,
        title: "Boots on the ground".to_string(),
        description: Some("Unboxing".to_string()),
        thumbnail_url: None,
        video_url: reference.map(|r| r.to_string()),
        created_at: now,
        updated_at: now,
    };
    app.videos.insert(video.clone());
    video
}

/// Split a signed media URL into its route path and query pairs.
pub fn split_signed_url(url: &str) -> (String, Vec<(String, String)>) {
    let rest = url
        .strip_prefix("http://localhost:8091")
        .expect("signed URL should use the media base URL");
    let (path, query) = rest.split_once('?').expect("signed URL should carry a query");
    let params = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path.to_string(), params)
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
