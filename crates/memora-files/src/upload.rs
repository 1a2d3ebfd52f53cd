//! Upload handle type.
//!
//! [`UploadFile`] stands in for the browser file object: a name, the declared
//! content type, a last-modified instant and the raw bytes. Readers dispatch
//! on the declared content type only; nothing here sniffs magic bytes.

use crate::ReadResult;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Uploaded file input (before metadata extraction).
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        last_modified: DateTime<Utc>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            last_modified,
            data: data.into(),
        }
    }

    /// Read a local file into an upload handle.
    ///
    /// The declared content type is derived from the file extension (unknown
    /// extensions become `application/octet-stream`) and the last-modified
    /// instant from the filesystem mtime.
    pub async fn from_path(path: impl AsRef<Path>) -> ReadResult<Self> {
        let path = path.as_ref();

        let data = tokio::fs::read(path).await?;
        let metadata = tokio::fs::metadata(path).await?;
        let last_modified: DateTime<Utc> = metadata.modified()?.into();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            name,
            content_type: mime_for_extension(&extension).to_string(),
            last_modified,
            data: Bytes::from(data),
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Map common extensions to their declared content type.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}
