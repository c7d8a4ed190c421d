//! Image upload utilities, for storing uploaded photos on disk.
//!
//! Uploads are written before the record that points at them. A written
//! image is a [`StagedImage`] until [`StagedImage::keep`] is called; if it is
//! dropped first (the database write failed), the file is deleted again.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ClubError, ClubResult};

/// The URL prefix uploaded images are served under.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// An image received in a multipart form, not yet written anywhere.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: Option<String>,
        content_type: Option<String>,
        content: Vec<u8>,
    ) -> ClubResult<Self> {
        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(ClubError::UnsupportedImage(format!(
                "expected an image/* upload, got {:?}",
                content_type
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            content,
        })
    }

    /// The extension of the uploaded file, falling back to the MIME subtype.
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|extension| extension.to_str());
        let from_type = self
            .content_type
            .strip_prefix("image/")
            .map(|subtype| subtype.split(['+', ';']).next().unwrap_or(subtype));

        from_name
            .or(from_type)
            .map(|extension| {
                extension
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect::<String>()
                    .to_ascii_lowercase()
            })
            .filter(|extension| !extension.is_empty())
            .unwrap_or_else(|| "img".to_owned())
    }

    /// Writes the image under a freshly generated name in `dir`.
    pub async fn stage(self, dir: &Path) -> ClubResult<StagedImage> {
        fs::create_dir_all(dir).await?;

        let file_name = format!("image-{}.{}", Uuid::new_v4().simple(), self.extension());
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(dir.join(&file_name))
            .await?;
        let staged = StagedImage {
            path: dir.join(&file_name),
            public_path: format!("{}/{}", UPLOAD_URL_PREFIX, file_name),
            kept: false,
        };

        file.write_all(&self.content).await?;
        file.flush().await?;
        debug!(path = %staged.path.display(), bytes = self.content.len(), "staged upload");

        Ok(staged)
    }
}

/// An image written to disk that nothing refers to yet.
#[derive(Debug)]
pub struct StagedImage {
    path: PathBuf,
    public_path: String,
    kept: bool,
}

impl StagedImage {
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path the image is served from, as stored in the database.
    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Marks the image as referenced, so it survives being dropped.
    pub fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        if self.kept {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed unused upload"),
            Err(err) => warn!(path = %self.path.display(), "failed to remove unused upload: {}", err),
        }
    }
}

/// Stages an optional upload.
pub async fn stage(upload: Option<ImageUpload>, dir: &Path) -> ClubResult<Option<StagedImage>> {
    match upload {
        Some(upload) => upload.stage(dir).await.map(Some),
        None => Ok(None),
    }
}

/// Keeps an optional staged upload.
pub fn keep(staged: Option<StagedImage>) {
    if let Some(staged) = staged {
        staged.keep();
    }
}
