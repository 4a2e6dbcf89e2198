pub mod dokumen;
pub mod dokumen_bundel;
pub mod kegiatan;
pub mod pengurus;
pub mod profil;

use axum::{
    body::Body,
    extract::Multipart,
    http::{header, StatusCode},
    response::Response,
};
use std::collections::HashMap;

use crate::attachment::FilePayload;
use crate::error::{AppError, Result};
use crate::storage::{ByteStream, StoredBlob};

/// Read a multipart request into text fields and named file payloads.
/// Files are buffered as bytes; slot validation happens in the services.
pub(crate) async fn read_multipart(
    multipart: &mut Multipart,
) -> Result<(HashMap<String, String>, HashMap<String, FilePayload>)> {
    let mut fields = HashMap::new();
    let mut files = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Gagal membaca multipart: {}", e)))?
    {
        let name = match field.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        if let Some(file_name) = field.file_name() {
            let file_name = file_name.to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Gagal membaca file: {}", e)))?;

            files.insert(
                name,
                FilePayload {
                    file_name,
                    content_type,
                    data,
                },
            );
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Gagal membaca field: {}", e)))?;
            fields.insert(name, text);
        }
    }

    Ok((fields, files))
}

/// Pipe a blob out as the response body, content type taken from the
/// stored blob. The stream is forwarded chunk by chunk, never buffered
/// whole.
pub(crate) fn stream_response(meta: StoredBlob, stream: ByteStream) -> Result<Response> {
    let fallback_name = meta.file_name.replace(['"', '\\'], "_");
    let encoded_name = urlencoding::encode(&meta.file_name).into_owned();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, meta.content_type)
        .header(header::CONTENT_LENGTH, meta.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename=\"{}\"; filename*=UTF-8''{}",
                fallback_name, encoded_name
            ),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
