//! Review photo upload with observable progress.

mod memory;

pub use memory::MemoryBlobStore;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::UploadError;
use crate::media::ValidatedPhoto;

/// Chunk size for upload sessions (256KiB).
pub const UPLOAD_CHUNK_BYTES: usize = 256 * 1024;

/// Storage key for a review photo, named by upload time the same way the
/// feed keys are.
pub fn photo_upload_key() -> String {
    format!("images/{}.jpg", chrono::Utc::now().timestamp_millis())
}

/// Trait for blob storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open a chunked upload session for a key.
    async fn start_upload(
        &self,
        key: &str,
        content_type: &str,
        total_bytes: u64,
    ) -> Result<Box<dyn BlobUpload>, UploadError>;

    /// Durable retrieval URL for a committed blob. Remains valid
    /// independent of any uploader's lifetime.
    async fn download_url(&self, key: &str) -> Result<String, UploadError>;
}

/// One chunked upload session. Nothing is retrievable until `commit`.
#[async_trait]
pub trait BlobUpload: Send {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError>;

    async fn commit(self: Box<Self>) -> Result<(), UploadError>;
}

/// Externally observable upload state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Running,
    Paused,
    Error,
    Complete,
}

/// Progress of one upload: discrete state plus completed fraction.
///
/// Fractions for a single upload are monotonically non-decreasing within
/// [0, 1]; the final fraction published before `Complete` is 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadProgress {
    pub state: UploadState,
    pub fraction: f64,
}

/// Uploads one review photo to blob storage.
///
/// Single-shot: each instance performs exactly one upload per submission;
/// a second `upload` call is rejected rather than deduplicated. Failures
/// publish the `Error` state and surface as [`UploadError`] with no
/// implicit retry; the caller decides whether to re-invoke with the same
/// photo (on a fresh uploader).
pub struct MediaUploader {
    store: Arc<dyn BlobStore>,
    progress: watch::Sender<UploadProgress>,
    paused: watch::Sender<bool>,
    used: AtomicBool,
}

impl MediaUploader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let (progress, _) = watch::channel(UploadProgress {
            state: UploadState::Running,
            fraction: 0.0,
        });
        let (paused, _) = watch::channel(false);
        Self {
            store,
            progress,
            paused,
            used: AtomicBool::new(false),
        }
    }

    /// Watch upload progress. Subscribe before calling `upload` to observe
    /// every transition.
    pub fn progress(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    /// Park the upload between chunks.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Upload a validated photo and resolve its durable URL.
    pub async fn upload(
        &self,
        key: &str,
        photo: &ValidatedPhoto,
    ) -> Result<String, UploadError> {
        if self.used.swap(true, Ordering::SeqCst) {
            return Err(UploadError::AlreadyUsed);
        }

        let total = photo.data.len();
        self.publish(UploadState::Running, 0.0);

        let result = self.drive(key, photo, total).await;
        match &result {
            Ok(_) => self.publish(UploadState::Complete, 1.0),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "upload failed");
                self.publish_state(UploadState::Error);
            }
        }
        result
    }

    async fn drive(
        &self,
        key: &str,
        photo: &ValidatedPhoto,
        total: usize,
    ) -> Result<String, UploadError> {
        let mut session = self
            .store
            .start_upload(key, &photo.content_type, total as u64)
            .await?;

        let mut sent = 0usize;
        for chunk in photo.data.chunks(UPLOAD_CHUNK_BYTES) {
            self.wait_if_paused().await;

            session.write_chunk(chunk).await?;
            sent += chunk.len();
            self.publish(UploadState::Running, sent as f64 / total as f64);
        }

        // Zero-byte photos never enter the chunk loop.
        self.publish(UploadState::Running, 1.0);

        session.commit().await?;
        self.store.download_url(key).await
    }

    async fn wait_if_paused(&self) {
        let mut paused = self.paused.subscribe();
        if *paused.borrow() {
            self.publish_state(UploadState::Paused);
            let _ = paused.wait_for(|p| !*p).await;
            self.publish_state(UploadState::Running);
        }
    }

    fn publish(&self, state: UploadState, fraction: f64) {
        self.progress.send_replace(UploadProgress { state, fraction });
    }

    /// Publish a state change keeping the current fraction.
    fn publish_state(&self, state: UploadState) {
        let fraction = self.progress.borrow().fraction;
        self.progress.send_replace(UploadProgress { state, fraction });
    }
}
