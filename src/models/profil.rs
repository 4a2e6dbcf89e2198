use serde::Serialize;
use sqlx::FromRow;

/// Profil record: organization vision/mission with one required image.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profil {
    pub id: String,
    /// Blob identifier of the profile image.
    pub gambar: String,
    pub visi: String,
    pub misi: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// List entry with the image identifier resolved to a display name.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilListItem {
    #[serde(flatten)]
    pub profil: Profil,
    #[serde(rename = "gambarName")]
    pub gambar_name: String,
}

/// Descriptive fields of a profil create/update request.
#[derive(Debug, Default)]
pub struct ProfilFields {
    pub visi: Option<String>,
    pub misi: Option<String>,
}
