use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pengurus record: one organization member.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pengurus {
    pub id: String,
    pub jabatan: String,
    pub nama: String,
    pub nim: String,
    pub jurusan: String,
    pub periode: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Create/update pengurus request
#[derive(Debug, Deserialize)]
pub struct PengurusRequest {
    pub jabatan: String,
    pub nama: String,
    pub nim: String,
    pub jurusan: String,
    pub periode: String,
}
