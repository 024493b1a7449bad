use std::path::{Path, PathBuf};

use axum_typed_multipart::FieldData;
use common::error::AppError;
use tempfile::NamedTempFile;
use uuid::Uuid;

pub mod audio;
pub mod capture;
pub mod chat;
pub mod documents;
pub mod pdf;

pub(crate) const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

const SNIPPET_MAX_CHARS: usize = 250;

/// Truncates extracted text for the response body, falling back to a fixed
/// message when nothing was extracted.
pub(crate) fn text_snippet(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
        return trimmed.to_string();
    }

    let mut snippet: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
    snippet.push_str("...");
    snippet
}

/// Extension of the uploaded file, lowercased, constrained to `allowed`.
pub(crate) fn upload_extension(
    file_name: Option<&str>,
    allowed: &[&str],
    default_ext: &str,
) -> String {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext {
        Some(ext) if allowed.contains(&ext.as_str()) => format!(".{ext}"),
        _ => default_ext.to_string(),
    }
}

/// Copies an uploaded temp file into `data_dir/uploads` under a fresh name
/// so it outlives the request's scoped temp file.
pub(crate) async fn store_upload(
    data_dir: &str,
    file: &FieldData<NamedTempFile>,
    allowed: &[&str],
    default_ext: &str,
) -> Result<PathBuf, AppError> {
    let ext = upload_extension(file.metadata.file_name.as_deref(), allowed, default_ext);

    let uploads_dir = Path::new(data_dir).join("uploads");
    tokio::fs::create_dir_all(&uploads_dir).await?;

    let destination = uploads_dir.join(format!("{}{ext}", Uuid::new_v4()));
    tokio::fs::copy(file.contents.path(), &destination).await?;

    Ok(destination)
}
