use super::error::ApiError;
use crate::ai::mime::resolve_image_mime;
use crate::app::App;
use crate::models::{clean_keywords, CaptionRequest, CaptionResponse};
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

pub const NO_FILE_SENT: &str = "No image file sent";
pub const NO_FILE_SELECTED: &str = "No file selected";

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!("Malformed multipart upload: {}", e);
    ApiError::BadRequest(format!("Invalid multipart upload: {}", e.body_text()))
}

/// Pull the `file` part and every `keywords` field out of the form.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(Option<UploadedFile>, Vec<String>), ApiError> {
    let mut file = None;
    let mut keywords = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" if file.is_none() => {
                // Without a filename or content type this is a plain form value.
                if field.file_name().is_none() && field.content_type().is_none() {
                    continue;
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "keywords" => {
                keywords.push(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok((file, clean_keywords(keywords)))
}

/// POST /gerar_legenda
pub async fn generate_caption(
    State(app): State<Arc<App>>,
    multipart: Multipart,
) -> Result<Json<CaptionResponse>, ApiError> {
    if !app.is_model_ready() {
        return Err(ApiError::ModelNotInitialized);
    }

    let (file, keywords) = read_form(multipart).await?;
    let file = file.ok_or_else(|| ApiError::BadRequest(NO_FILE_SENT.to_string()))?;
    if file.file_name.is_empty() {
        return Err(ApiError::BadRequest(NO_FILE_SELECTED.to_string()));
    }

    let mime_type = resolve_image_mime(file.content_type.as_deref(), &file.bytes);
    let request = CaptionRequest::new(file.bytes, mime_type, keywords);

    let outcome = app.caption(&request).await?;
    Ok(Json(CaptionResponse {
        legenda: outcome.into_legenda(),
    }))
}

/// GET /health
pub async fn health(State(app): State<Arc<App>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_ready": app.is_model_ready(),
    }))
}
