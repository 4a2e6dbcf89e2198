use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ApiResponse, Result};
use crate::handlers::{read_multipart, stream_response};
use crate::models::{Dokumen, DokumenFields, DokumenListItem};
use crate::services::DokumenService;
use crate::AppState;

/// List all dokumen
/// GET /api/dokumen
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<DokumenListItem>>>> {
    let items = DokumenService::list(&state.db, &state.attachments).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Get a single dokumen
/// GET /api/dokumen/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Dokumen>>> {
    let dokumen = DokumenService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(dokumen)))
}

/// Stream the stored file
/// GET /api/dokumen/:id/file
pub async fn stream_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let (meta, stream) = DokumenService::stream_file(&state.db, &state.attachments, &id).await?;
    stream_response(meta, stream)
}

fn dokumen_fields(fields: &std::collections::HashMap<String, String>) -> DokumenFields {
    DokumenFields {
        jenis_dokumen: fields.get("jenisDokumen").cloned(),
        nomor_surat: fields.get("nomorSurat").cloned(),
    }
}

/// Create a dokumen (multipart: jenisDokumen, nomorSurat, file)
/// POST /api/dokumen
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (fields, files) = read_multipart(&mut multipart).await?;
    let dokumen =
        DokumenService::create(&state.db, &state.attachments, dokumen_fields(&fields), files)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Dokumen dibuat", dokumen)),
    ))
}

/// Update a dokumen, optionally replacing the file
/// PUT /api/dokumen/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Dokumen>>> {
    let (fields, files) = read_multipart(&mut multipart).await?;
    let dokumen = DokumenService::update(
        &state.db,
        &state.attachments,
        &id,
        dokumen_fields(&fields),
        files,
    )
    .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Dokumen diperbarui",
        dokumen,
    )))
}

/// Delete a dokumen and its file
/// DELETE /api/dokumen/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    DokumenService::delete(&state.db, &state.attachments, &id).await?;
    Ok(Json(ApiResponse::<()>::success_message("Dokumen dihapus")))
}
