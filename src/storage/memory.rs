use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::{BlobStore, ByteStream, StoredBlob};

/// In-memory blob store used by tests. Supports failure injection so the
/// lifecycle flows can be exercised against a misbehaving store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, (StoredBlob, Bytes)>>,
    puts_until_failure: AtomicUsize,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail.
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    /// Let `n` more puts succeed, then fail the rest.
    pub fn fail_puts_after(&self, n: usize) {
        self.puts_until_failure.store(n, Ordering::SeqCst);
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    /// Remove a blob without going through `delete`, simulating
    /// out-of-band loss.
    pub fn remove_out_of_band(&self, blob_id: &str) {
        self.blobs.lock().unwrap().remove(blob_id);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, file_name: &str, content_type: &str, data: Bytes) -> Result<StoredBlob> {
        if self.fail_puts.load(Ordering::SeqCst) {
            let remaining = self.puts_until_failure.load(Ordering::SeqCst);
            if remaining == 0 {
                return Err(AppError::Storage("injected put failure".to_string()));
            }
            self.puts_until_failure.store(remaining - 1, Ordering::SeqCst);
        }

        let meta = StoredBlob {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size: data.len() as i64,
            created_at: Utc::now().to_rfc3339(),
        };

        self.blobs
            .lock()
            .unwrap()
            .insert(meta.id.clone(), (meta.clone(), data));
        Ok(meta)
    }

    async fn describe(&self, blob_id: &str) -> Result<Option<StoredBlob>> {
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .get(blob_id)
            .map(|(meta, _)| meta.clone()))
    }

    async fn open(&self, blob_id: &str) -> Result<(StoredBlob, ByteStream)> {
        let (meta, data) = self
            .blobs
            .lock()
            .unwrap()
            .get(blob_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Blob not found: {}", blob_id)))?;

        let stream: ByteStream = Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        }));
        Ok((meta, stream))
    }

    async fn delete(&self, blob_id: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected delete failure".to_string()));
        }

        self.blobs
            .lock()
            .unwrap()
            .remove(blob_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Blob not found: {}", blob_id)))
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}
