use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ApiResponse, Result};
use crate::handlers::{read_multipart, stream_response};
use crate::models::{Profil, ProfilFields, ProfilListItem};
use crate::services::ProfilService;
use crate::AppState;

/// List all profil
/// GET /api/profil
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<ProfilListItem>>>> {
    let items = ProfilService::list(&state.db, &state.attachments).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Get a single profil
/// GET /api/profil/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Profil>>> {
    let profil = ProfilService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(profil)))
}

/// Stream the profile image
/// GET /api/profil/:id/gambar
pub async fn stream_gambar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let (meta, stream) = ProfilService::stream_gambar(&state.db, &state.attachments, &id).await?;
    stream_response(meta, stream)
}

fn profil_fields(fields: &std::collections::HashMap<String, String>) -> ProfilFields {
    ProfilFields {
        visi: fields.get("visi").cloned(),
        misi: fields.get("misi").cloned(),
    }
}

/// Create a profil (multipart: visi, misi, gambar)
/// POST /api/profil
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (fields, files) = read_multipart(&mut multipart).await?;
    let profil =
        ProfilService::create(&state.db, &state.attachments, profil_fields(&fields), files).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Profil berhasil dibuat", profil)),
    ))
}

/// Update a profil, optionally replacing the image
/// PUT /api/profil/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Profil>>> {
    let (fields, files) = read_multipart(&mut multipart).await?;
    let profil =
        ProfilService::update(&state.db, &state.attachments, &id, profil_fields(&fields), files)
            .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Profil berhasil diperbarui",
        profil,
    )))
}

/// Delete a profil and its image
/// DELETE /api/profil/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    ProfilService::delete(&state.db, &state.attachments, &id).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Profil dan gambarnya berhasil dihapus",
    )))
}
