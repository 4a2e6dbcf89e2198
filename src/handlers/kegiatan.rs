use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ApiResponse, Result};
use crate::handlers::{read_multipart, stream_response};
use crate::models::{Kegiatan, KegiatanFields, KegiatanListItem};
use crate::services::KegiatanService;
use crate::AppState;

/// List all kegiatan
/// GET /api/kegiatan
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<KegiatanListItem>>>> {
    let items = KegiatanService::list(&state.db, &state.attachments).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Get a single kegiatan
/// GET /api/kegiatan/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Kegiatan>>> {
    let kegiatan = KegiatanService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(kegiatan)))
}

/// Stream the documentation photo
/// GET /api/kegiatan/:id/dokumentasi
pub async fn stream_dokumentasi(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let (meta, stream) =
        KegiatanService::stream_dokumentasi(&state.db, &state.attachments, &id).await?;
    stream_response(meta, stream)
}

fn kegiatan_fields(fields: &std::collections::HashMap<String, String>) -> KegiatanFields {
    KegiatanFields {
        judul: fields.get("judul").cloned(),
        deskripsi: fields.get("deskripsi").cloned(),
    }
}

/// Create a kegiatan (multipart: judul, deskripsi, dokumentasi)
/// POST /api/kegiatan
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (fields, files) = read_multipart(&mut multipart).await?;
    let kegiatan =
        KegiatanService::create(&state.db, &state.attachments, kegiatan_fields(&fields), files)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Kegiatan berhasil dibuat",
            kegiatan,
        )),
    ))
}

/// Update a kegiatan, optionally replacing the photo
/// PUT /api/kegiatan/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Kegiatan>>> {
    let (fields, files) = read_multipart(&mut multipart).await?;
    let kegiatan = KegiatanService::update(
        &state.db,
        &state.attachments,
        &id,
        kegiatan_fields(&fields),
        files,
    )
    .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Kegiatan berhasil diperbarui",
        kegiatan,
    )))
}

/// Delete a kegiatan and its photo
/// DELETE /api/kegiatan/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    KegiatanService::delete(&state.db, &state.attachments, &id).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Kegiatan dan dokumentasi berhasil dihapus",
    )))
}
