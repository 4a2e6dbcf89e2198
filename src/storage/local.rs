use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::{BlobStore, ByteStream, StoredBlob};

/// Local file system blob store. Bytes live under `{base}/{id}.bin`, the
/// metadata sidecar under `{base}/{id}.json`. The sidecar is written last,
/// so an interrupted upload never resolves.
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn data_path(&self, blob_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.bin", blob_id))
    }

    fn meta_path(&self, blob_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", blob_id))
    }

    async fn read_meta(&self, blob_id: &str) -> Result<Option<StoredBlob>> {
        // Reject path-traversal attempts before touching the filesystem
        if blob_id.is_empty() || blob_id.contains('/') || blob_id.contains('\\') || blob_id.contains("..") {
            return Ok(None);
        }

        match fs::read(self.meta_path(blob_id)).await {
            Ok(raw) => {
                let meta: StoredBlob = serde_json::from_slice(&raw).map_err(|e| {
                    AppError::Storage(format!("Corrupt blob metadata for {}: {}", blob_id, e))
                })?;
                Ok(Some(meta))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read blob metadata {}: {}",
                blob_id, e
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, file_name: &str, content_type: &str, data: Bytes) -> Result<StoredBlob> {
        fs::create_dir_all(&self.base_path).await?;

        let blob_id = Uuid::new_v4().to_string();
        let meta = StoredBlob {
            id: blob_id.clone(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size: data.len() as i64,
            created_at: Utc::now().to_rfc3339(),
        };

        // Write bytes to a temp path first; rename only once complete.
        let data_path = self.data_path(&blob_id);
        let tmp_path = self.base_path.join(format!("{}.tmp", blob_id));

        let write_result: Result<()> = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(&data).await?;
            file.flush().await?;
            fs::rename(&tmp_path, &data_path).await?;
            Ok(())
        }
        .await;

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(AppError::Storage(format!("Failed to write blob: {}", e)));
        }

        // The sidecar makes the identifier resolvable; clean the data file
        // up if it cannot be written.
        let encoded = serde_json::to_vec(&meta)
            .map_err(|e| AppError::Storage(format!("Failed to encode blob metadata: {}", e)))?;
        if let Err(e) = fs::write(self.meta_path(&blob_id), &encoded).await {
            let _ = fs::remove_file(&data_path).await;
            return Err(AppError::Storage(format!(
                "Failed to write blob metadata: {}",
                e
            )));
        }

        tracing::debug!("Stored blob {} ({} bytes)", blob_id, meta.size);
        Ok(meta)
    }

    async fn describe(&self, blob_id: &str) -> Result<Option<StoredBlob>> {
        self.read_meta(blob_id).await
    }

    async fn open(&self, blob_id: &str) -> Result<(StoredBlob, ByteStream)> {
        let meta = self
            .read_meta(blob_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blob not found: {}", blob_id)))?;

        let file = fs::File::open(self.data_path(blob_id)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("Blob not found: {}", blob_id))
            } else {
                AppError::Storage(format!("Failed to open blob {}: {}", blob_id, e))
            }
        })?;

        let stream: ByteStream = Box::pin(ReaderStream::new(file));
        Ok((meta, stream))
    }

    async fn delete(&self, blob_id: &str) -> Result<()> {
        if self.read_meta(blob_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Blob not found: {}", blob_id)));
        }

        // Remove the sidecar first so the identifier stops resolving even
        // if the data-file removal fails.
        fs::remove_file(self.meta_path(blob_id)).await?;
        if let Err(e) = fs::remove_file(self.data_path(blob_id)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(AppError::Storage(format!(
                    "Failed to remove blob data {}: {}",
                    blob_id, e
                )));
            }
        }

        tracing::debug!("Deleted blob {}", blob_id);
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn put_then_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let meta = store
            .put("foto.jpg", "image/jpeg", Bytes::from_static(b"jpegdata"))
            .await
            .unwrap();
        assert_eq!(meta.file_name, "foto.jpg");
        assert_eq!(meta.size, 8);

        let described = store.describe(&meta.id).await.unwrap().unwrap();
        assert_eq!(described.content_type, "image/jpeg");

        let (opened, stream) = store.open(&meta.id).await.unwrap();
        assert_eq!(opened.file_name, "foto.jpg");
        assert_eq!(collect(stream).await, b"jpegdata");
    }

    #[tokio::test]
    async fn delete_makes_identifier_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let meta = store
            .put("surat.pdf", "application/pdf", Bytes::from_static(b"pdf"))
            .await
            .unwrap();
        store.delete(&meta.id).await.unwrap();

        assert!(store.describe(&meta.id).await.unwrap().is_none());
        assert!(matches!(
            store.open(&meta.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&meta.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_identifiers_do_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        assert!(store.describe("../etc/passwd").await.unwrap().is_none());
    }
}
