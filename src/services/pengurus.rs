use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Pengurus, PengurusRequest};

/// Pengurus service: member records, no attachments.
pub struct PengurusService;

impl PengurusService {
    /// List all pengurus
    pub async fn list(db: &Database) -> Result<Vec<Pengurus>> {
        let records: Vec<Pengurus> = sqlx::query_as("SELECT * FROM pengurus ORDER BY created_at ASC")
            .fetch_all(db.pool())
            .await?;

        Ok(records)
    }

    /// Get a pengurus by ID
    pub async fn get(db: &Database, id: &str) -> Result<Pengurus> {
        let pengurus: Pengurus = sqlx::query_as("SELECT * FROM pengurus WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Pengurus tidak ditemukan".to_string()))?;

        Ok(pengurus)
    }

    fn validate(req: &PengurusRequest) -> Result<()> {
        let mut errors = Vec::new();
        if req.jabatan.trim().is_empty() {
            errors.push("Jabatan wajib diisi".to_string());
        }
        if req.nama.trim().is_empty() {
            errors.push("Nama wajib diisi".to_string());
        }
        if req.nim.trim().is_empty() {
            errors.push("NIM wajib diisi".to_string());
        }
        if req.jurusan.trim().is_empty() {
            errors.push("Jurusan wajib diisi".to_string());
        }
        if req.periode.trim().is_empty() {
            errors.push("Periode wajib diisi".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    async fn nim_taken(db: &Database, nim: &str, exclude_id: Option<&str>) -> Result<bool> {
        let count: (i64,) = if let Some(id) = exclude_id {
            sqlx::query_as("SELECT COUNT(*) FROM pengurus WHERE nim = ? AND id != ?")
                .bind(nim)
                .bind(id)
                .fetch_one(db.pool())
                .await?
        } else {
            sqlx::query_as("SELECT COUNT(*) FROM pengurus WHERE nim = ?")
                .bind(nim)
                .fetch_one(db.pool())
                .await?
        };

        Ok(count.0 > 0)
    }

    /// Create a pengurus
    pub async fn create(db: &Database, req: PengurusRequest) -> Result<Pengurus> {
        Self::validate(&req)?;

        if Self::nim_taken(db, &req.nim, None).await? {
            return Err(AppError::validation("NIM sudah digunakan"));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO pengurus (id, jabatan, nama, nim, jurusan, periode, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.jabatan)
        .bind(&req.nama)
        .bind(&req.nim)
        .bind(&req.jurusan)
        .bind(&req.periode)
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Self::get(db, &id).await
    }

    /// Update a pengurus
    pub async fn update(db: &Database, id: &str, req: PengurusRequest) -> Result<Pengurus> {
        Self::validate(&req)?;

        let pengurus = Self::get(db, id).await?;
        if req.nim != pengurus.nim && Self::nim_taken(db, &req.nim, Some(id)).await? {
            return Err(AppError::validation("NIM sudah digunakan"));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE pengurus SET jabatan = ?, nama = ?, nim = ?, jurusan = ?, periode = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&req.jabatan)
        .bind(&req.nama)
        .bind(&req.nim)
        .bind(&req.jurusan)
        .bind(&req.periode)
        .bind(&now)
        .bind(id)
        .execute(db.pool())
        .await?;

        Self::get(db, id).await
    }

    /// Delete a pengurus
    pub async fn delete(db: &Database, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM pengurus WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pengurus tidak ditemukan".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> Database {
        let db = Database::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn req(nama: &str, nim: &str) -> PengurusRequest {
        PengurusRequest {
            jabatan: "Ketua".to_string(),
            nama: nama.to_string(),
            nim: nim.to_string(),
            jurusan: "Informatika".to_string(),
            periode: "2025/2026".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_nim_is_rejected() {
        let db = setup().await;

        PengurusService::create(&db, req("Andi", "101")).await.unwrap();
        let err = PengurusService::create(&db, req("Budi", "101")).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(PengurusService::list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_can_keep_own_nim() {
        let db = setup().await;

        let created = PengurusService::create(&db, req("Andi", "101")).await.unwrap();
        let updated = PengurusService::update(&db, &created.id, req("Andi Saputra", "101"))
            .await
            .unwrap();

        assert_eq!(updated.nama, "Andi Saputra");
        assert_eq!(updated.nim, "101");
    }

    #[tokio::test]
    async fn missing_fields_are_enumerated() {
        let db = setup().await;

        let err = PengurusService::create(
            &db,
            PengurusRequest {
                jabatan: String::new(),
                nama: "Andi".to_string(),
                nim: String::new(),
                jurusan: "Informatika".to_string(),
                periode: String::new(),
            },
        )
        .await
        .unwrap_err();

        match err {
            AppError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_missing_pengurus_is_not_found() {
        let db = setup().await;

        assert!(matches!(
            PengurusService::delete(&db, "tidak-ada").await,
            Err(AppError::NotFound(_))
        ));
    }
}
