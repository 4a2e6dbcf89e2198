use serde::Serialize;
use sqlx::FromRow;

/// Kegiatan record: an activity log entry with one documentation photo.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Kegiatan {
    pub id: String,
    pub judul: String,
    pub deskripsi: String,
    /// Blob identifier of the documentation photo.
    pub dokumentasi: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// List entry with the documentation identifier resolved to a display name.
#[derive(Debug, Clone, Serialize)]
pub struct KegiatanListItem {
    #[serde(flatten)]
    pub kegiatan: Kegiatan,
    #[serde(rename = "dokumentasiName")]
    pub dokumentasi_name: String,
}

/// Descriptive fields of a kegiatan create/update request.
#[derive(Debug, Default)]
pub struct KegiatanFields {
    pub judul: Option<String>,
    pub deskripsi: Option<String>,
}
