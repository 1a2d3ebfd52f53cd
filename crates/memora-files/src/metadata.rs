//! File categories, the MIME dispatch table and the uniform descriptors.
//!
//! `read_file` looks the declared MIME type up in a static table (exact,
//! case-sensitive string match) and invokes the matching reader. Unregistered
//! types go through a fallback that only looks at the last-modified instant
//! and cannot fail.

use crate::image::{read_image, ExifTags};
use crate::upload::UploadFile;
use crate::ReadResult;
use chrono::SecondsFormat;
use futures::future::BoxFuture;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Upload classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileCategory {
    Image,
    Sound,
    Video,
}

impl FromStr for FileCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IMAGE" => Ok(FileCategory::Image),
            "SOUND" => Ok(FileCategory::Sound),
            "VIDEO" => Ok(FileCategory::Video),
            _ => Err(anyhow::anyhow!("Invalid file category: {}", s)),
        }
    }
}

impl Display for FileCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileCategory::Image => write!(f, "IMAGE"),
            FileCategory::Sound => write!(f, "SOUND"),
            FileCategory::Video => write!(f, "VIDEO"),
        }
    }
}

/// Intended retention tier. Declared by the caller, never inferred by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStorage {
    Preview,
    FullQuality,
    Raw,
}

impl FromStr for FileStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREVIEW" => Ok(FileStorage::Preview),
            "FULL_QUALITY" => Ok(FileStorage::FullQuality),
            "RAW" => Ok(FileStorage::Raw),
            _ => Err(anyhow::anyhow!("Invalid file storage tier: {}", s)),
        }
    }
}

impl Display for FileStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileStorage::Preview => write!(f, "PREVIEW"),
            FileStorage::FullQuality => write!(f, "FULL_QUALITY"),
            FileStorage::Raw => write!(f, "RAW"),
        }
    }
}

/// Structured tag data, or absent for files without any.
pub type FileTags = Option<ExifTags>;

/// Transient result of inspecting one file.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FileInfo {
    /// Capture date as an ISO-8601 string, when known.
    pub date: Option<String>,
    /// Preview reference (a `data:` URL), possibly empty.
    pub preview: String,
    pub tags: FileTags,
}

/// Persisted-file descriptor.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FileMetadata {
    pub filename: String,
    pub mime: String,
    pub size: u64,
    pub storage: FileStorage,
    pub public: bool,
    pub date: Option<String>,
    pub tags: FileTags,
}

/// Build the persisted descriptor from an upload and its reader result.
pub fn to_file_metadata(
    file: &UploadFile,
    info: &FileInfo,
    storage: FileStorage,
    public: bool,
) -> FileMetadata {
    FileMetadata {
        filename: file.name.clone(),
        mime: file.content_type.clone(),
        size: file.size(),
        storage,
        public,
        date: info.date.clone(),
        tags: info.tags.clone(),
    }
}

/// A reader converts a raw upload into a [`FileInfo`] descriptor.
pub type ReaderFn = for<'a> fn(&'a UploadFile) -> BoxFuture<'a, ReadResult<FileInfo>>;

/// One dispatch table entry: a category and the reader handling it.
#[derive(Clone, Copy)]
pub struct ReaderOptions {
    pub category: FileCategory,
    pub reader: ReaderFn,
}

fn image_reader(file: &UploadFile) -> BoxFuture<'_, ReadResult<FileInfo>> {
    Box::pin(read_image(file))
}

pub const IMAGE_OPTIONS: ReaderOptions = ReaderOptions {
    category: FileCategory::Image,
    reader: image_reader,
};

// TODO: supply real sound/video readers. Both entries still resolve to the
// image reader and nothing registers them in MIME_OPTIONS, so no sound or
// video MIME type ever dispatches here.
pub const SOUND_OPTIONS: ReaderOptions = ReaderOptions {
    category: FileCategory::Sound,
    reader: image_reader,
};

pub const VIDEO_OPTIONS: ReaderOptions = ReaderOptions {
    category: FileCategory::Video,
    reader: image_reader,
};

/// MIME type → reader dispatch table. Lookup is an exact, case-sensitive
/// string match against the declared content type; no sniffing.
pub const MIME_OPTIONS: &[(&str, ReaderOptions)] = &[
    ("image/bmp", IMAGE_OPTIONS),
    ("image/png", IMAGE_OPTIONS),
    ("image/jpeg", IMAGE_OPTIONS),
    ("image/gif", IMAGE_OPTIONS),
    ("image/svg+xml", IMAGE_OPTIONS),
    ("image/webp", IMAGE_OPTIONS),
];

pub fn is_supported_mime(mime: &str) -> bool {
    MIME_OPTIONS.iter().any(|(registered, _)| *registered == mime)
}

/// Fallback for unregistered MIME types: last-modified instant as the date,
/// no preview, no tags. Never inspects file contents, never fails.
pub async fn read_unsupported_file(file: &UploadFile) -> FileInfo {
    FileInfo {
        date: Some(
            file.last_modified
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        preview: String::new(),
        tags: None,
    }
}

/// Read preview metadata from an uploaded file, dispatching on its declared
/// MIME type. Reader failures for registered types propagate; unregistered
/// types always succeed through the fallback.
pub async fn read_file(file: &UploadFile) -> ReadResult<FileInfo> {
    let mime = file.content_type.as_str();

    if let Some((_, options)) = MIME_OPTIONS.iter().find(|(registered, _)| *registered == mime) {
        tracing::debug!(mime, category = %options.category, "dispatching file reader");
        return (options.reader)(file).await;
    }

    tracing::debug!(mime, "unregistered MIME type, using fallback reader");
    Ok(read_unsupported_file(file).await)
}
