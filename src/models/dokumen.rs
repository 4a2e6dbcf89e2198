use serde::Serialize;
use sqlx::FromRow;

/// Fixed enumeration of correspondence kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JenisDokumen {
    #[serde(rename = "suratMasuk")]
    SuratMasuk,
    #[serde(rename = "suratKeluar")]
    SuratKeluar,
    #[serde(rename = "lpjKegiatan")]
    LpjKegiatan,
}

impl JenisDokumen {
    pub fn as_str(&self) -> &'static str {
        match self {
            JenisDokumen::SuratMasuk => "suratMasuk",
            JenisDokumen::SuratKeluar => "suratKeluar",
            JenisDokumen::LpjKegiatan => "lpjKegiatan",
        }
    }

    /// Parse a request value; unknown kinds are rejected at the boundary.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "suratMasuk" => Some(JenisDokumen::SuratMasuk),
            "suratKeluar" => Some(JenisDokumen::SuratKeluar),
            "lpjKegiatan" => Some(JenisDokumen::LpjKegiatan),
            _ => None,
        }
    }
}

/// Dokumen record, tunggal variant: one file tagged with a kind and an
/// optional letter number.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dokumen {
    pub id: String,
    #[serde(rename = "jenisDokumen")]
    pub jenis_dokumen: String,
    /// Blob identifier of the stored document.
    pub file: String,
    #[serde(rename = "nomorSurat")]
    pub nomor_surat: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// List entry with the file identifier resolved to a display name.
#[derive(Debug, Clone, Serialize)]
pub struct DokumenListItem {
    #[serde(flatten)]
    pub dokumen: Dokumen,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// Descriptive fields of a dokumen (tunggal) create/update request.
#[derive(Debug, Default)]
pub struct DokumenFields {
    pub jenis_dokumen: Option<String>,
    pub nomor_surat: Option<String>,
}

/// Dokumen record, bundel variant: three fixed PDF slots, all required
/// together.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DokumenBundel {
    pub id: String,
    #[serde(rename = "suratMasuk")]
    pub surat_masuk: String,
    #[serde(rename = "suratKeluar")]
    pub surat_keluar: String,
    #[serde(rename = "lpjKegiatan")]
    pub lpj_kegiatan: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// List entry with every slot resolved to a display name.
#[derive(Debug, Clone, Serialize)]
pub struct DokumenBundelListItem {
    #[serde(flatten)]
    pub dokumen: DokumenBundel,
    #[serde(rename = "suratMasukName")]
    pub surat_masuk_name: String,
    #[serde(rename = "suratKeluarName")]
    pub surat_keluar_name: String,
    #[serde(rename = "lpjKegiatanName")]
    pub lpj_kegiatan_name: String,
}
