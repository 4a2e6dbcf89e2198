use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ApiResponse, Result};
use crate::handlers::{read_multipart, stream_response};
use crate::models::{DokumenBundel, DokumenBundelListItem};
use crate::services::DokumenBundelService;
use crate::AppState;

/// List all bundles
/// GET /api/dokumen
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DokumenBundelListItem>>>> {
    let items = DokumenBundelService::list(&state.db, &state.attachments).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Get a single bundle
/// GET /api/dokumen/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DokumenBundel>>> {
    let dokumen = DokumenBundelService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(dokumen)))
}

/// Stream one of the bundle's PDFs
/// GET /api/dokumen/:id/pdf/:slot
pub async fn stream_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(String, String)>,
) -> Result<Response> {
    let (meta, stream) =
        DokumenBundelService::stream_slot(&state.db, &state.attachments, &id, &slot).await?;
    stream_response(meta, stream)
}

/// Create a bundle (multipart: suratMasuk, suratKeluar, lpjKegiatan)
/// POST /api/dokumen
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (_fields, files) = read_multipart(&mut multipart).await?;
    let dokumen = DokumenBundelService::create(&state.db, &state.attachments, files).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Dokumen dibuat", dokumen)),
    ))
}

/// Replace any subset of the bundle's PDFs
/// PUT /api/dokumen/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<DokumenBundel>>> {
    let (_fields, files) = read_multipart(&mut multipart).await?;
    let dokumen = DokumenBundelService::update(&state.db, &state.attachments, &id, files).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Dokumen diperbarui",
        dokumen,
    )))
}

/// Delete a bundle and its PDFs
/// DELETE /api/dokumen/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    DokumenBundelService::delete(&state.db, &state.attachments, &id).await?;
    Ok(Json(ApiResponse::<()>::success_message("Dokumen dihapus")))
}
