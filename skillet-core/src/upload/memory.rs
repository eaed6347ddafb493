//! In-process blob store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BlobStore, BlobUpload};
use crate::error::UploadError;

/// In-memory blob store for tests and local development.
///
/// Blobs become visible only when their session commits; a committed
/// blob's URL stays resolvable for the life of the store, independent of
/// the uploader that produced it.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, StoredBlob>>>,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    content_type: String,
    data: Vec<u8>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed blob bytes and content type, if present.
    pub fn blob(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .map(|blob| (blob.content_type.clone(), blob.data.clone()))
    }
}

struct MemoryUpload {
    key: String,
    content_type: String,
    staged: Vec<u8>,
    blobs: Arc<Mutex<HashMap<String, StoredBlob>>>,
}

#[async_trait]
impl BlobUpload for MemoryUpload {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.staged.extend_from_slice(chunk);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), UploadError> {
        let blob = StoredBlob {
            content_type: self.content_type,
            data: self.staged,
        };
        self.blobs.lock().unwrap().insert(self.key, blob);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn start_upload(
        &self,
        key: &str,
        content_type: &str,
        total_bytes: u64,
    ) -> Result<Box<dyn BlobUpload>, UploadError> {
        Ok(Box::new(MemoryUpload {
            key: key.to_string(),
            content_type: content_type.to_string(),
            staged: Vec::with_capacity(total_bytes as usize),
            blobs: self.blobs.clone(),
        }))
    }

    async fn download_url(&self, key: &str) -> Result<String, UploadError> {
        if self.blobs.lock().unwrap().contains_key(key) {
            Ok(format!("mem://{}", key))
        } else {
            Err(UploadError::NotFound(key.to_string()))
        }
    }
}
