//! HTTP handlers

pub mod health;
pub mod predict;
pub mod metrics;
pub mod stream;
pub mod batch;
pub mod ticket;
pub mod features;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::{AppError, AppResult};

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Name and content of the `file` part
pub(crate) async fn read_upload(mut multipart: Multipart) -> AppResult<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        return Ok((file_name, bytes));
    }

    Err(AppError::ValidationError("no file provided".to_string()))
}
