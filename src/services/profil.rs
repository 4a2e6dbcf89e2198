use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::attachment::{AttachmentManager, FilePayload, ResourceSpec, SlotPayloads, SlotSpec};
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Profil, ProfilFields, ProfilListItem};
use crate::storage::{ByteStream, StoredBlob};

pub const PROFIL_SPEC: ResourceSpec = ResourceSpec {
    resource: "profil",
    slots: &[SlotSpec {
        name: "gambar",
        required: true,
    }],
};

/// Profil service
pub struct ProfilService;

impl ProfilService {
    /// List all profil records, oldest first, image names resolved.
    pub async fn list(db: &Database, attachments: &AttachmentManager) -> Result<Vec<ProfilListItem>> {
        let records: Vec<Profil> = sqlx::query_as("SELECT * FROM profil ORDER BY created_at ASC")
            .fetch_all(db.pool())
            .await?;

        // Independent lookups, resolved concurrently across records.
        let items = futures::future::join_all(records.into_iter().map(|profil| async move {
            let gambar_name = attachments.resolve_name(&profil.gambar).await;
            ProfilListItem { profil, gambar_name }
        }))
        .await;

        Ok(items)
    }

    /// Get a profil by ID
    pub async fn get(db: &Database, id: &str) -> Result<Profil> {
        let profil: Profil = sqlx::query_as("SELECT * FROM profil WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Profil tidak ditemukan".to_string()))?;

        Ok(profil)
    }

    /// Open a stream over the profile image.
    pub async fn stream_gambar(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
    ) -> Result<(StoredBlob, ByteStream)> {
        let profil = Self::get(db, id).await?;
        attachments.stream(&profil.gambar).await
    }

    /// Create a profil with its image
    pub async fn create(
        db: &Database,
        attachments: &AttachmentManager,
        fields: ProfilFields,
        files: HashMap<String, FilePayload>,
    ) -> Result<Profil> {
        let mut errors = Vec::new();
        let visi = match fields.visi.filter(|v| !v.trim().is_empty()) {
            Some(v) => v,
            None => {
                errors.push("Visi wajib diisi".to_string());
                String::new()
            }
        };
        let misi = match fields.misi.filter(|m| !m.trim().is_empty()) {
            Some(m) => m,
            None => {
                errors.push("Misi wajib diisi".to_string());
                String::new()
            }
        };

        let payloads = match SlotPayloads::for_create(&PROFIL_SPEC, files) {
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

        // Upload before the record that references it is written.
        let gambar = attachments.upload(payloads.required("gambar")?).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO profil (id, gambar, visi, misi, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&gambar)
        .bind(&visi)
        .bind(&misi)
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Self::get(db, &id).await
    }

    /// Update descriptive fields and, when a new image is supplied,
    /// replace the old blob.
    pub async fn update(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
        fields: ProfilFields,
        files: HashMap<String, FilePayload>,
    ) -> Result<Profil> {
        let mut profil = Self::get(db, id).await?;

        if let Some(visi) = fields.visi {
            profil.visi = visi;
        }
        if let Some(misi) = fields.misi {
            profil.misi = misi;
        }

        let payloads = SlotPayloads::for_update(&PROFIL_SPEC, files)?;
        if let Some(payload) = payloads.get("gambar") {
            profil.gambar = attachments.replace(Some(&profil.gambar), payload).await?;
        }

        // Record save happens last, after every slot replacement completed.
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE profil SET gambar = ?, visi = ?, misi = ?, updated_at = ? WHERE id = ?")
            .bind(&profil.gambar)
            .bind(&profil.visi)
            .bind(&profil.misi)
            .bind(&now)
            .bind(id)
            .execute(db.pool())
            .await?;

        Self::get(db, id).await
    }

    /// Delete a profil and release its image
    pub async fn delete(db: &Database, attachments: &AttachmentManager, id: &str) -> Result<()> {
        let profil = Self::get(db, id).await?;

        sqlx::query("DELETE FROM profil WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        attachments.release(&profil.gambar).await;
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

    fn gambar(data: &'static [u8]) -> HashMap<String, FilePayload> {
        let mut files = HashMap::new();
        files.insert(
            "gambar".to_string(),
            FilePayload {
                file_name: "logo.png".to_string(),
                content_type: "image/png".to_string(),
                data: Bytes::from_static(data),
            },
        );
        files
    }

    fn fields(visi: &str, misi: &str) -> ProfilFields {
        ProfilFields {
            visi: Some(visi.to_string()),
            misi: Some(misi.to_string()),
        }
    }

    #[tokio::test]
    async fn create_uploads_blob_before_persisting_record() {
        let (db, store, manager) = setup().await;

        let profil = ProfilService::create(&db, &manager, fields("Visi", "Misi"), gambar(b"png"))
            .await
            .unwrap();

        assert!(store.describe(&profil.gambar).await.unwrap().is_some());
        assert_eq!(profil.visi, "Visi");
    }

    #[tokio::test]
    async fn create_with_missing_fields_uploads_nothing() {
        let (db, store, manager) = setup().await;

        let err = ProfilService::create(&db, &manager, ProfilFields::default(), HashMap::new())
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("Visi")));
                assert!(errors.iter().any(|e| e.contains("Misi")));
                assert!(errors.iter().any(|e| e.contains("gambar")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.blob_count(), 0);
        assert!(ProfilService::list(&db, &manager).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_failing_store_persists_no_record() {
        let (db, store, manager) = setup().await;
        store.fail_puts();

        let err = ProfilService::create(&db, &manager, fields("Visi", "Misi"), gambar(b"png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(ProfilService::list(&db, &manager).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_image_and_deletes_old_blob() {
        let (db, store, manager) = setup().await;

        let created = ProfilService::create(&db, &manager, fields("Visi", "Misi"), gambar(b"one"))
            .await
            .unwrap();
        let old_gambar = created.gambar.clone();

        let updated = ProfilService::update(
            &db,
            &manager,
            &created.id,
            ProfilFields::default(),
            gambar(b"two"),
        )
        .await
        .unwrap();

        assert_ne!(updated.gambar, old_gambar);
        assert!(store.describe(&old_gambar).await.unwrap().is_none());
        assert!(store.describe(&updated.gambar).await.unwrap().is_some());
        // Untouched descriptive fields survive.
        assert_eq!(updated.visi, "Visi");
    }

    #[tokio::test]
    async fn delete_releases_image_and_removes_record() {
        let (db, store, manager) = setup().await;

        let created = ProfilService::create(&db, &manager, fields("Visi", "Misi"), gambar(b"png"))
            .await
            .unwrap();

        ProfilService::delete(&db, &manager, &created.id).await.unwrap();

        assert!(matches!(
            ProfilService::get(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.describe(&created.gambar).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_release_fails() {
        let (db, store, manager) = setup().await;

        let created = ProfilService::create(&db, &manager, fields("Visi", "Misi"), gambar(b"png"))
            .await
            .unwrap();
        store.fail_deletes();

        ProfilService::delete(&db, &manager, &created.id).await.unwrap();
        assert!(matches!(
            ProfilService::get(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_degrades_to_unknown_for_missing_blobs() {
        let (db, store, manager) = setup().await;

        let a = ProfilService::create(&db, &manager, fields("A", "A"), gambar(b"a"))
            .await
            .unwrap();
        let b = ProfilService::create(&db, &manager, fields("B", "B"), gambar(b"b"))
            .await
            .unwrap();
        store.remove_out_of_band(&a.gambar);

        let items = ProfilService::list(&db, &manager).await.unwrap();
        assert_eq!(items.len(), 2);
        let broken = items.iter().find(|i| i.profil.id == a.id).unwrap();
        let intact = items.iter().find(|i| i.profil.id == b.id).unwrap();
        assert_eq!(broken.gambar_name, "Unknown");
        assert_eq!(intact.gambar_name, "logo.png");
    }
}
