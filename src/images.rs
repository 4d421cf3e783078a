use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const FALLBACK_IMAGE_URL: &str = "/images/no-image.png";
pub const PRODUCT_IMAGE_FOLDER: &str = "products";

#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes: bytes.into(),
        }
    }

    fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Storage for uploaded catalog images, addressed by public URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `upload` under `folder`. Returns `None` for an empty upload.
    async fn save_image(&self, upload: ImageUpload, folder: &str) -> AppResult<Option<String>>;

    /// Remove a previously saved image. Failures are logged, never returned.
    async fn delete_image(&self, url: &str);

    /// `path` if it can be displayed, the placeholder image otherwise.
    async fn safe_image_url(&self, path: Option<&str>) -> String;
}

pub struct FsImageStore {
    web_root: PathBuf,
}

impl FsImageStore {
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        Self {
            web_root: web_root.into(),
        }
    }

    /// Map a site-relative URL to a file under the web root, refusing anything
    /// that would escape it.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.web_root.join(relative))
    }
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

fn is_valid_folder(folder: &str) -> bool {
    !folder.is_empty()
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save_image(&self, upload: ImageUpload, folder: &str) -> AppResult<Option<String>> {
        if upload.bytes.is_empty() {
            tracing::warn!("refusing to save an empty image upload");
            return Ok(None);
        }
        if !is_valid_folder(folder) {
            return Err(AppError::BadRequest(format!("invalid image folder {folder}")));
        }

        let file_name = match upload.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let dir = self.web_root.join("uploads").join(folder);
        let path = dir.join(&file_name);

        let written = async {
            fs::create_dir_all(&dir).await?;
            fs::write(&path, &upload.bytes).await
        }
        .await;
        if let Err(err) = written {
            tracing::error!(error = %err, path = %path.display(), "failed to save image");
            return Err(AppError::Io(err));
        }

        let url = format!("/uploads/{folder}/{file_name}");
        tracing::info!(url = %url, bytes = upload.bytes.len(), "image saved");
        Ok(Some(url))
    }

    async fn delete_image(&self, url: &str) {
        if url.is_empty() || url.contains("placeholder") || is_external(url) {
            return;
        }
        let Some(path) = self.resolve(url) else {
            tracing::warn!(url = %url, "refusing to delete image outside web root");
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "image deleted"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "image to delete not found");
            }
            Err(err) => {
                tracing::error!(error = %err, path = %path.display(), "failed to delete image");
            }
        }
    }

    async fn safe_image_url(&self, path: Option<&str>) -> String {
        let path = match path.map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => return FALLBACK_IMAGE_URL.to_string(),
        };
        if is_external(path) {
            return path.to_string();
        }

        let exists = match self.resolve(path) {
            Some(full) => fs::metadata(&full)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            None => false,
        };
        if exists {
            path.to_string()
        } else {
            tracing::debug!(path = %path, "image not found, using placeholder");
            FALLBACK_IMAGE_URL.to_string()
        }
    }
}
