use axum::{extract::Multipart, Json};
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::services::cloudinary::{CloudinaryClient, UploadError};

/// POST /upload - relay a multipart `image` field to the image host
pub async fn upload(mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let client = CloudinaryClient::from_config(&config::config().cloudinary)?;

    let mut uploaded = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !CloudinaryClient::is_allowed_format(&content_type) {
            return Err(UploadError::UnsupportedFormat(content_type).into());
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?;

        uploaded = Some(client.upload(filename, bytes.to_vec()).await?);
        break;
    }

    let image = uploaded.ok_or(UploadError::MissingFile)?;
    Ok(Json(json!({
        "success": true,
        "message": "Upload succeeded",
        "url": image.secure_url,
    })))
}
