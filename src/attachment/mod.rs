pub mod slots;

pub use slots::*;

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::storage::{BlobStore, ByteStream, StoredBlob};

/// Display name substituted when a blob reference no longer resolves.
/// A single broken reference must not fail a whole list view.
pub const UNKNOWN_FILE_NAME: &str = "Unknown";

/// Attachment lifecycle manager.
///
/// Orchestrates the invariant that every blob reference held by a persisted
/// record points at an existing blob, and that superseded or released blobs
/// get deleted. Upload always precedes the metadata write that references
/// it; deletion of an old blob always follows acquisition of its
/// replacement. Cleanup deletes are best-effort: failures are logged and
/// swallowed, never propagated.
#[derive(Clone)]
pub struct AttachmentManager {
    store: Arc<dyn BlobStore>,
}

impl AttachmentManager {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Upload a payload and return the blob identifier referenced by the
    /// caller's metadata record.
    pub async fn upload(&self, payload: &FilePayload) -> Result<String> {
        if payload.data.is_empty() {
            return Err(AppError::validation(format!(
                "File {} kosong",
                payload.file_name
            )));
        }

        let meta = self
            .store
            .put(&payload.file_name, &payload.content_type, payload.data.clone())
            .await?;
        tracing::debug!(
            "Uploaded attachment {} as blob {}",
            payload.file_name,
            meta.id
        );
        Ok(meta.id)
    }

    /// Resolve a blob identifier to its stored filename for display.
    /// Degrades to the `Unknown` literal on any resolution failure.
    pub async fn resolve_name(&self, blob_id: &str) -> String {
        match self.store.describe(blob_id).await {
            Ok(Some(meta)) => meta.file_name,
            Ok(None) => {
                tracing::warn!("Blob {} no longer resolves, using fallback name", blob_id);
                UNKNOWN_FILE_NAME.to_string()
            }
            Err(e) => {
                tracing::warn!("Failed to resolve blob {}: {}", blob_id, e);
                UNKNOWN_FILE_NAME.to_string()
            }
        }
    }

    /// Open a single-pass read stream over a blob's content.
    pub async fn stream(&self, blob_id: &str) -> Result<(StoredBlob, ByteStream)> {
        self.store.open(blob_id).await
    }

    /// Upload a replacement payload, then request deletion of the blob it
    /// supersedes. The old blob is only touched after the new identifier
    /// exists; a failed delete never aborts the replace.
    pub async fn replace(&self, old_blob_id: Option<&str>, payload: &FilePayload) -> Result<String> {
        let new_id = self.upload(payload).await?;

        if let Some(old_id) = old_blob_id {
            if let Err(e) = self.store.delete(old_id).await {
                tracing::warn!("Failed to delete superseded blob {}: {}", old_id, e);
            }
        }

        Ok(new_id)
    }

    /// Best-effort deletion of a blob whose owning record is gone.
    pub async fn release(&self, blob_id: &str) {
        if let Err(e) = self.store.delete(blob_id).await {
            tracing::warn!("Failed to release blob {}: {}", blob_id, e);
        }
    }
}
