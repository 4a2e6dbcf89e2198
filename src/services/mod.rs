pub mod dokumen;
pub mod dokumen_bundel;
pub mod kegiatan;
pub mod pengurus;
pub mod profil;

pub use dokumen::DokumenService;
pub use dokumen_bundel::DokumenBundelService;
pub use kegiatan::KegiatanService;
pub use pengurus::PengurusService;
pub use profil::ProfilService;
