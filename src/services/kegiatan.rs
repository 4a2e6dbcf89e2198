use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::attachment::{AttachmentManager, FilePayload, ResourceSpec, SlotPayloads, SlotSpec};
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Kegiatan, KegiatanFields, KegiatanListItem};
use crate::storage::{ByteStream, StoredBlob};

pub const KEGIATAN_SPEC: ResourceSpec = ResourceSpec {
    resource: "kegiatan",
    slots: &[SlotSpec {
        name: "dokumentasi",
        required: true,
    }],
};

/// Kegiatan service
pub struct KegiatanService;

impl KegiatanService {
    /// List all kegiatan, newest first, documentation names resolved.
    pub async fn list(db: &Database, attachments: &AttachmentManager) -> Result<Vec<KegiatanListItem>> {
        let records: Vec<Kegiatan> =
            sqlx::query_as("SELECT * FROM kegiatan ORDER BY created_at DESC")
                .fetch_all(db.pool())
                .await?;

        let items = futures::future::join_all(records.into_iter().map(|kegiatan| async move {
            let dokumentasi_name = attachments.resolve_name(&kegiatan.dokumentasi).await;
            KegiatanListItem {
                kegiatan,
                dokumentasi_name,
            }
        }))
        .await;

        Ok(items)
    }

    /// Get a kegiatan by ID
    pub async fn get(db: &Database, id: &str) -> Result<Kegiatan> {
        let kegiatan: Kegiatan = sqlx::query_as("SELECT * FROM kegiatan WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Kegiatan tidak ditemukan".to_string()))?;

        Ok(kegiatan)
    }

    /// Open a stream over the documentation photo.
    pub async fn stream_dokumentasi(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
    ) -> Result<(StoredBlob, ByteStream)> {
        let kegiatan = Self::get(db, id).await?;
        attachments.stream(&kegiatan.dokumentasi).await
    }

    /// Create a kegiatan with its documentation photo
    pub async fn create(
        db: &Database,
        attachments: &AttachmentManager,
        fields: KegiatanFields,
        files: HashMap<String, FilePayload>,
    ) -> Result<Kegiatan> {
        let mut errors = Vec::new();
        let judul = match fields.judul.filter(|j| !j.trim().is_empty()) {
            Some(j) => j,
            None => {
                errors.push("Judul wajib diisi".to_string());
                String::new()
            }
        };
        let deskripsi = match fields.deskripsi.filter(|d| !d.trim().is_empty()) {
            Some(d) => d,
            None => {
                errors.push("Deskripsi wajib diisi".to_string());
                String::new()
            }
        };

        let payloads = match SlotPayloads::for_create(&KEGIATAN_SPEC, files) {
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

        let dokumentasi = attachments.upload(payloads.required("dokumentasi")?).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO kegiatan (id, judul, deskripsi, dokumentasi, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&judul)
        .bind(&deskripsi)
        .bind(&dokumentasi)
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Self::get(db, &id).await
    }

    /// Update descriptive fields and optionally replace the photo.
    pub async fn update(
        db: &Database,
        attachments: &AttachmentManager,
        id: &str,
        fields: KegiatanFields,
        files: HashMap<String, FilePayload>,
    ) -> Result<Kegiatan> {
        let mut kegiatan = Self::get(db, id).await?;

        if let Some(judul) = fields.judul {
            kegiatan.judul = judul;
        }
        if let Some(deskripsi) = fields.deskripsi {
            kegiatan.deskripsi = deskripsi;
        }

        let payloads = SlotPayloads::for_update(&KEGIATAN_SPEC, files)?;
        if let Some(payload) = payloads.get("dokumentasi") {
            kegiatan.dokumentasi = attachments
                .replace(Some(&kegiatan.dokumentasi), payload)
                .await?;
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE kegiatan SET judul = ?, deskripsi = ?, dokumentasi = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&kegiatan.judul)
        .bind(&kegiatan.deskripsi)
        .bind(&kegiatan.dokumentasi)
        .bind(&now)
        .bind(id)
        .execute(db.pool())
        .await?;

        Self::get(db, id).await
    }

    /// Delete a kegiatan and release its documentation photo
    pub async fn delete(db: &Database, attachments: &AttachmentManager, id: &str) -> Result<()> {
        let kegiatan = Self::get(db, id).await?;

        sqlx::query("DELETE FROM kegiatan WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        attachments.release(&kegiatan.dokumentasi).await;
        Ok(())
    }
}
