use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::{ApiResponse, Result};
use crate::models::{Pengurus, PengurusRequest};
use crate::services::PengurusService;
use crate::AppState;

/// List all pengurus
/// GET /api/pengurus
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Pengurus>>>> {
    let records = PengurusService::list(&state.db).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// Get a single pengurus
/// GET /api/pengurus/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Pengurus>>> {
    let pengurus = PengurusService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(pengurus)))
}

/// Create a pengurus
/// POST /api/pengurus
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<PengurusRequest>,
) -> Result<impl IntoResponse> {
    let pengurus = PengurusService::create(&state.db, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Pengurus berhasil dibuat",
            pengurus,
        )),
    ))
}

/// Update a pengurus
/// PUT /api/pengurus/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PengurusRequest>,
) -> Result<Json<ApiResponse<Pengurus>>> {
    let pengurus = PengurusService::update(&state.db, &id, req).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Pengurus berhasil diperbarui",
        pengurus,
    )))
}

/// Delete a pengurus
/// DELETE /api/pengurus/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    PengurusService::delete(&state.db, &id).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Pengurus berhasil dihapus",
    )))
}
