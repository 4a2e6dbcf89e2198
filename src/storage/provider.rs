use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;

/// Sequential, single-pass stream of blob content. Not seekable and not
/// restartable; a second read requires a fresh `open` call.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Metadata the blob store keeps alongside the raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBlob {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: String,
}

/// Blob store capability: streamed upload/download/delete keyed by a
/// store-generated identifier.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a blob and return its metadata. A failed write must never
    /// leave a resolvable identifier behind.
    async fn put(&self, file_name: &str, content_type: &str, data: Bytes) -> Result<StoredBlob>;

    /// Look up a blob's stored metadata. `None` when the identifier does
    /// not resolve.
    async fn describe(&self, blob_id: &str) -> Result<Option<StoredBlob>>;

    /// Open a read stream positioned at the start of the blob content.
    /// Fails with `NotFound` when the identifier does not resolve.
    async fn open(&self, blob_id: &str) -> Result<(StoredBlob, ByteStream)>;

    /// Delete a blob. Fails with `NotFound` when the identifier does not
    /// resolve.
    async fn delete(&self, blob_id: &str) -> Result<()>;

    /// Get the storage type name
    fn store_type(&self) -> &'static str;
}
