pub mod dokumen;
pub mod kegiatan;
pub mod pengurus;
pub mod profil;
pub mod user;

pub use dokumen::*;
pub use kegiatan::*;
pub use pengurus::*;
pub use profil::*;
pub use user::*;
