//! Persistence of incoming images into the upload folder.

use chrono::Utc;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A persisted upload: where the file landed on disk plus the path echoed
/// back to the caller.
#[derive(Debug, Clone)]
pub struct SavedUpload {
    pub path: PathBuf,
    pub public_path: String,
}

/// Writes incoming images under timestamped, sanitized names.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).await?;
        }
        Ok(Self { root })
    }

    /// Saves a multipart upload as `{unix_millis}_{sanitized_original_name}`.
    pub async fn save_multipart(
        &self,
        original_name: &str,
        data: &[u8],
    ) -> Result<SavedUpload, AppError> {
        let file_name = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        self.write(file_name, data).await
    }

    /// Saves a decoded base64 upload as `{unix_millis}.{ext}`.
    pub async fn save_base64(&self, extension: &str, data: &[u8]) -> Result<SavedUpload, AppError> {
        let file_name = format!(
            "{}.{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(extension)
        );
        self.write(file_name, data).await
    }

    async fn write(&self, file_name: String, data: &[u8]) -> Result<SavedUpload, AppError> {
        let path = self.root.join(&file_name);
        fs::write(&path, data).await?;
        let public_path = public_path(&path);
        Ok(SavedUpload { path, public_path })
    }
}

/// Keeps ASCII alphanumerics plus `.`, `-` and `_`; everything else becomes
/// `_`. Path separators never survive.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn public_path(path: &Path) -> String {
    let display = path.display().to_string();
    format!("/{}", display.trim_start_matches("./").trim_start_matches('/'))
}
