use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::attachment::{AttachmentManager, FilePayload, ResourceSpec, SlotPayloads, SlotSpec};
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Dokumen, DokumenFields, DokumenListItem, JenisDokumen};
use crate::storage::{ByteStream, StoredBlob};

pub const DOKUMEN_SPEC: ResourceSpec = ResourceSpec {
    resource: "dokumen",
    slots: &[SlotSpec {
        name: "file",
        required: true,
    }],
};

/// Dokumen service, tunggal variant: one file per record, tagged with a
/// jenis drawn from a fixed enumeration.
pub struct DokumenService;

impl DokumenService {
    /// List all dokumen, newest first, file names resolved.
    pub async fn list(db: &Database, attachments: &AttachmentManager) -> Result<Vec<DokumenListItem>> {
        let records: Vec<Dokumen> = sqlx::query_as("SELECT * FROM dokumen ORDER BY created_at DESC")
            .fetch_all(db.pool())
            .await?;

        let items = futures::future::join_all(records.into_iter().map(|dokumen| async move {
            let file_name = attachments.resolve_name(&dokumen.file).await;
            DokumenListItem { dokumen, file_name }
        }))
        .await;

        Ok(items)
    }

    /// Get a dokumen by ID
    pub async fn get(db: &Database, id: &str) -> Result<Dokumen> {
        let dokumen: Dokumen = sqlx::query_as("SELECT * FROM dokumen WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Dokumen tidak ditemukan".to_string()))?;

        Ok(dokumen)
    }

    /// Open a stream over the stored file.
    pub async fn stream_file(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
    ) -> Result<(StoredBlob, ByteStream)> {
        let dokumen = Self::get(db, id).await?;
        attachments.stream(&dokumen.file).await
    }

    /// Create a dokumen with its file
    pub async fn create(
        db: &Database,
        attachments: &AttachmentManager,
        fields: DokumenFields,
        files: HashMap<String, FilePayload>,
    ) -> Result<Dokumen> {
        let mut errors = Vec::new();
        let jenis = match fields.jenis_dokumen.as_deref() {
            None | Some("") => {
                errors.push("Jenis dokumen wajib diisi".to_string());
                None
            }
            Some(raw) => match JenisDokumen::parse(raw) {
                Some(jenis) => Some(jenis),
                None => {
                    errors.push("Jenis dokumen tidak valid".to_string());
                    None
                }
            },
        };

        let payloads = match SlotPayloads::for_create(&DOKUMEN_SPEC, files) {
            Ok(p) => p,
            Err(AppError::Validation(mut file_errors)) => {
                errors.append(&mut file_errors);
                return Err(AppError::Validation(errors));
            }
            Err(e) => return Err(e),
        };
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let jenis = jenis
            .ok_or_else(|| AppError::Internal("jenis dokumen missing after validation".to_string()))?;

        let file = attachments.upload(payloads.required("file")?).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO dokumen (id, jenis_dokumen, file, nomor_surat, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(jenis.as_str())
        .bind(&file)
        .bind(&fields.nomor_surat)
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Self::get(db, &id).await
    }

    /// Update descriptive fields and optionally replace the file.
    pub async fn update(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
        fields: DokumenFields,
        files: HashMap<String, FilePayload>,
    ) -> Result<Dokumen> {
        let mut dokumen = Self::get(db, id).await?;

        if let Some(raw) = fields.jenis_dokumen {
            let jenis = JenisDokumen::parse(&raw)
                .ok_or_else(|| AppError::validation("Jenis dokumen tidak valid"))?;
            dokumen.jenis_dokumen = jenis.as_str().to_string();
        }
        if let Some(nomor_surat) = fields.nomor_surat {
            dokumen.nomor_surat = Some(nomor_surat);
        }

        let payloads = SlotPayloads::for_update(&DOKUMEN_SPEC, files)?;
        if let Some(payload) = payloads.get("file") {
            dokumen.file = attachments.replace(Some(&dokumen.file), payload).await?;
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE dokumen SET jenis_dokumen = ?, file = ?, nomor_surat = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&dokumen.jenis_dokumen)
        .bind(&dokumen.file)
        .bind(&dokumen.nomor_surat)
        .bind(&now)
        .bind(id)
        .execute(db.pool())
        .await?;

        Self::get(db, id).await
    }

    /// Delete a dokumen and release its file
    pub async fn delete(db: &Database, attachments: &AttachmentManager, id: &str) -> Result<()> {
        let dokumen = Self::get(db, id).await?;

        sqlx::query("DELETE FROM dokumen WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        attachments.release(&dokumen.file).await;
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

    fn file(name: &str) -> HashMap<String, FilePayload> {
        let mut files = HashMap::new();
        files.insert(
            "file".to_string(),
            FilePayload {
                file_name: name.to_string(),
                content_type: "application/pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.4"),
            },
        );
        files
    }

    #[tokio::test]
    async fn create_surat_masuk_with_nomor_surat() {
        let (db, store, manager) = setup().await;

        let dokumen = DokumenService::create(
            &db,
            &manager,
            DokumenFields {
                jenis_dokumen: Some("suratMasuk".to_string()),
                nomor_surat: Some("001/A".to_string()),
            },
            file("undangan.pdf"),
        )
        .await
        .unwrap();

        assert_eq!(dokumen.jenis_dokumen, "suratMasuk");
        assert_eq!(dokumen.nomor_surat.as_deref(), Some("001/A"));
        assert!(store.describe(&dokumen.file).await.unwrap().is_some());

        // The list view carries the original upload name.
        let items = DokumenService::list(&db, &manager).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file_name, "undangan.pdf");
    }

    #[tokio::test]
    async fn unknown_jenis_is_rejected_before_upload() {
        let (db, store, manager) = setup().await;

        let err = DokumenService::create(
            &db,
            &manager,
            DokumenFields {
                jenis_dokumen: Some("suratCinta".to_string()),
                nomor_surat: None,
            },
            file("surat.pdf"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn replace_file_swaps_blob_and_keeps_fields() {
        let (db, store, manager) = setup().await;

        let created = DokumenService::create(
            &db,
            &manager,
            DokumenFields {
                jenis_dokumen: Some("lpjKegiatan".to_string()),
                nomor_surat: Some("007/LPJ".to_string()),
            },
            file("lpj-v1.pdf"),
        )
        .await
        .unwrap();

        let updated = DokumenService::update(
            &db,
            &manager,
            &created.id,
            DokumenFields::default(),
            file("lpj-v2.pdf"),
        )
        .await
        .unwrap();

        assert_ne!(updated.file, created.file);
        assert!(store.describe(&created.file).await.unwrap().is_none());
        assert_eq!(updated.nomor_surat.as_deref(), Some("007/LPJ"));
        assert_eq!(manager.resolve_name(&updated.file).await, "lpj-v2.pdf");
    }

    #[tokio::test]
    async fn delete_then_read_and_stream_both_miss() {
        let (db, _store, manager) = setup().await;

        let created = DokumenService::create(
            &db,
            &manager,
            DokumenFields {
                jenis_dokumen: Some("suratKeluar".to_string()),
                nomor_surat: None,
            },
            file("balasan.pdf"),
        )
        .await
        .unwrap();
        let blob_id = created.file.clone();

        DokumenService::delete(&db, &manager, &created.id).await.unwrap();

        assert!(matches!(
            DokumenService::get(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            manager.stream(&blob_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
