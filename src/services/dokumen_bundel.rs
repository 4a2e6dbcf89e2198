use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::attachment::{AttachmentManager, FilePayload, ResourceSpec, SlotPayloads, SlotSpec};
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{DokumenBundel, DokumenBundelListItem};
use crate::storage::{ByteStream, StoredBlob};

pub const DOKUMEN_BUNDEL_SPEC: ResourceSpec = ResourceSpec {
    resource: "dokumen",
    slots: &[
        SlotSpec { name: "suratMasuk", required: true },
        SlotSpec { name: "suratKeluar", required: true },
        SlotSpec { name: "lpjKegiatan", required: true },
    ],
};

/// Dokumen service, bundel variant: three fixed PDF slots per record, all
/// required at creation.
pub struct DokumenBundelService;

impl DokumenBundelService {
    /// List all bundles, newest first, every slot name resolved.
    pub async fn list(
        db: &Database,
        attachments: &AttachmentManager,
    ) -> Result<Vec<DokumenBundelListItem>> {
        let records: Vec<DokumenBundel> =
            sqlx::query_as("SELECT * FROM dokumen_bundel ORDER BY created_at DESC")
                .fetch_all(db.pool())
                .await?;

        let items = futures::future::join_all(records.into_iter().map(|dokumen| async move {
            let (surat_masuk_name, surat_keluar_name, lpj_kegiatan_name) = futures::join!(
                attachments.resolve_name(&dokumen.surat_masuk),
                attachments.resolve_name(&dokumen.surat_keluar),
                attachments.resolve_name(&dokumen.lpj_kegiatan),
            );
            DokumenBundelListItem {
                dokumen,
                surat_masuk_name,
                surat_keluar_name,
                lpj_kegiatan_name,
            }
        }))
        .await;

        Ok(items)
    }

    /// Get a bundle by ID
    pub async fn get(db: &Database, id: &str) -> Result<DokumenBundel> {
        let dokumen: DokumenBundel = sqlx::query_as("SELECT * FROM dokumen_bundel WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Dokumen tidak ditemukan".to_string()))?;

        Ok(dokumen)
    }

    fn slot_ref<'a>(dokumen: &'a DokumenBundel, slot: &str) -> Result<&'a str> {
        match slot {
            "suratMasuk" => Ok(&dokumen.surat_masuk),
            "suratKeluar" => Ok(&dokumen.surat_keluar),
            "lpjKegiatan" => Ok(&dokumen.lpj_kegiatan),
            other => Err(AppError::BadRequest(format!(
                "Field file tidak dikenal: {}",
                other
            ))),
        }
    }

    /// Open a stream over one of the bundle's slots. The slot name is
    /// validated against the fixed set before any lookup.
    pub async fn stream_slot(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
        slot: &str,
    ) -> Result<(StoredBlob, ByteStream)> {
        if !DOKUMEN_BUNDEL_SPEC.has_slot(slot) {
            return Err(AppError::BadRequest(format!(
                "Field file tidak dikenal: {}",
                slot
            )));
        }

        let dokumen = Self::get(db, id).await?;
        attachments.stream(Self::slot_ref(&dokumen, slot)?).await
    }

    /// Create a bundle from its three PDFs. Uploads run one after another;
    /// any failure aborts the whole create and no record is persisted
    /// (earlier uploads are not rolled back).
    pub async fn create(
        db: &Database,
        attachments: &AttachmentManager,
        files: HashMap<String, FilePayload>,
    ) -> Result<DokumenBundel> {
        let payloads = SlotPayloads::for_create(&DOKUMEN_BUNDEL_SPEC, files).map_err(|e| {
            if matches!(e, AppError::Validation(_)) {
                AppError::validation("Semua file PDF wajib diupload")
            } else {
                e
            }
        })?;

        let surat_masuk = attachments.upload(payloads.required("suratMasuk")?).await?;
        let surat_keluar = attachments.upload(payloads.required("suratKeluar")?).await?;
        let lpj_kegiatan = attachments.upload(payloads.required("lpjKegiatan")?).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO dokumen_bundel (id, surat_masuk, surat_keluar, lpj_kegiatan, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&surat_masuk)
        .bind(&surat_keluar)
        .bind(&lpj_kegiatan)
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Self::get(db, &id).await
    }

    /// Replace any subset of the three slots.
    pub async fn update(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
        files: HashMap<String, FilePayload>,
    ) -> Result<DokumenBundel> {
        let mut dokumen = Self::get(db, id).await?;

        let payloads = SlotPayloads::for_update(&DOKUMEN_BUNDEL_SPEC, files)?;
        if let Some(payload) = payloads.get("suratMasuk") {
            dokumen.surat_masuk = attachments
                .replace(Some(&dokumen.surat_masuk), payload)
                .await?;
        }
        if let Some(payload) = payloads.get("suratKeluar") {
            dokumen.surat_keluar = attachments
                .replace(Some(&dokumen.surat_keluar), payload)
                .await?;
        }
        if let Some(payload) = payloads.get("lpjKegiatan") {
            dokumen.lpj_kegiatan = attachments
                .replace(Some(&dokumen.lpj_kegiatan), payload)
                .await?;
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE dokumen_bundel SET surat_masuk = ?, surat_keluar = ?, lpj_kegiatan = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&dokumen.surat_masuk)
        .bind(&dokumen.surat_keluar)
        .bind(&dokumen.lpj_kegiatan)
        .bind(&now)
        .bind(id)
        .execute(db.pool())
        .await?;

        Self::get(db, id).await
    }

    /// Delete a bundle and release all three blobs. Releases are attempted
    /// independently; none of them can fail the delete.
    pub async fn delete(db: &Database, attachments: &AttachmentManager, id: &str) -> Result<()> {
        let dokumen = Self::get(db, id).await?;

        sqlx::query("DELETE FROM dokumen_bundel WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        futures::join!(
            attachments.release(&dokumen.surat_masuk),
            attachments.release(&dokumen.surat_keluar),
            attachments.release(&dokumen.lpj_kegiatan),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BlobStore, MemoryBlobStore};
    use bytes::Bytes;
    use std::sync::Arc;

    async fn setup() -> (Database, Arc<MemoryBlobStore>, AttachmentManager) {
        let db = Database::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let store = Arc::new(MemoryBlobStore::new());
        let manager = AttachmentManager::new(store.clone());
        (db, store, manager)
    }

    fn pdf(name: &str) -> FilePayload {
        FilePayload {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    fn all_slots() -> HashMap<String, FilePayload> {
        let mut files = HashMap::new();
        files.insert("suratMasuk".to_string(), pdf("masuk.pdf"));
        files.insert("suratKeluar".to_string(), pdf("keluar.pdf"));
        files.insert("lpjKegiatan".to_string(), pdf("lpj.pdf"));
        files
    }

    #[tokio::test]
    async fn create_persists_all_three_slots() {
        let (db, store, manager) = setup().await;

        let dokumen = DokumenBundelService::create(&db, &manager, all_slots())
            .await
            .unwrap();

        for blob_id in [&dokumen.surat_masuk, &dokumen.surat_keluar, &dokumen.lpj_kegiatan] {
            assert!(store.describe(blob_id).await.unwrap().is_some());
        }

        let items = DokumenBundelService::list(&db, &manager).await.unwrap();
        assert_eq!(items[0].surat_masuk_name, "masuk.pdf");
        assert_eq!(items[0].lpj_kegiatan_name, "lpj.pdf");
    }

    #[tokio::test]
    async fn missing_required_slot_creates_nothing() {
        let (db, store, manager) = setup().await;

        let mut files = all_slots();
        files.remove("lpjKegiatan");

        let err = DokumenBundelService::create(&db, &manager, files).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Validation runs before any upload, so the store stays empty.
        assert_eq!(store.blob_count(), 0);
        assert!(DokumenBundelService::list(&db, &manager).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_failure_mid_bundle_persists_no_record() {
        let (db, store, manager) = setup().await;
        store.fail_puts_after(2);

        let err = DokumenBundelService::create(&db, &manager, all_slots())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        // No record is visible; the two already-uploaded blobs remain as
        // documented orphans.
        assert!(DokumenBundelService::list(&db, &manager).await.unwrap().is_empty());
        assert_eq!(store.blob_count(), 2);
    }

    #[tokio::test]
    async fn stream_rejects_unknown_slot_name() {
        let (db, _store, manager) = setup().await;

        let dokumen = DokumenBundelService::create(&db, &manager, all_slots())
            .await
            .unwrap();

        assert!(matches!(
            DokumenBundelService::stream_slot(&db, &manager, &dokumen.id, "lampiran").await,
            Err(AppError::BadRequest(_))
        ));

        let (meta, _stream) =
            DokumenBundelService::stream_slot(&db, &manager, &dokumen.id, "suratKeluar")
                .await
                .unwrap();
        assert_eq!(meta.file_name, "keluar.pdf");
    }

    #[tokio::test]
    async fn update_replaces_only_supplied_slots() {
        let (db, store, manager) = setup().await;

        let created = DokumenBundelService::create(&db, &manager, all_slots())
            .await
            .unwrap();

        let mut files = HashMap::new();
        files.insert("suratMasuk".to_string(), pdf("masuk-v2.pdf"));

        let updated = DokumenBundelService::update(&db, &manager, &created.id, files)
            .await
            .unwrap();

        assert_ne!(updated.surat_masuk, created.surat_masuk);
        assert_eq!(updated.surat_keluar, created.surat_keluar);
        assert_eq!(updated.lpj_kegiatan, created.lpj_kegiatan);
        assert!(store.describe(&created.surat_masuk).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_releases_every_slot() {
        let (db, store, manager) = setup().await;

        let created = DokumenBundelService::create(&db, &manager, all_slots())
            .await
            .unwrap();

        DokumenBundelService::delete(&db, &manager, &created.id).await.unwrap();

        assert!(matches!(
            DokumenBundelService::get(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.blob_count(), 0);
    }
}
