//! Memora upload metadata readers
//!
//! Converts user-uploaded files into uniform preview descriptors by
//! dispatching on the declared MIME type: image types go through an
//! EXIF-aware reader that extracts the capture date, structured tags and a
//! thumbnail preview; everything else falls back to a reader that never
//! inspects file contents and cannot fail.

pub mod image;
pub mod metadata;
pub mod upload;

use thiserror::Error;

pub use crate::image::{read_image, ExifTags};
pub use crate::metadata::{
    is_supported_mime, read_file, read_unsupported_file, to_file_metadata, FileCategory, FileInfo,
    FileMetadata, FileStorage, FileTags, ReaderFn, ReaderOptions, IMAGE_OPTIONS, MIME_OPTIONS,
    SOUND_OPTIONS, VIDEO_OPTIONS,
};
pub use crate::upload::UploadFile;

/// File reading errors
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to decode {mime} data: {source}")]
    Decode {
        mime: String,
        #[source]
        source: ::image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for file reading operations
pub type ReadResult<T> = Result<T, ReadError>;
