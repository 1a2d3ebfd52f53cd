//! Image-aware reader.
//!
//! Extracts the EXIF capture date and structured tags (best effort, never an
//! error) and renders a bounded thumbnail preview as a `data:` URL. SVG is
//! embedded as-is under its own MIME type; raster data that fails to decode
//! is a real error and propagates.

use crate::metadata::FileInfo;
use crate::upload::UploadFile;
use crate::{ReadError, ReadResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDateTime;
use exif::{In, Tag};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

const SVG_MIME: &str = "image/svg+xml";

/// Thumbnail bound in pixels on the long edge.
const THUMBNAIL_EDGE: u32 = 256;

/// Structured tag data extracted from an image's EXIF block.
///
/// Timestamps keep the raw EXIF `YYYY:MM:DD HH:MM:SS` form; the reader
/// converts to ISO-8601 only for the [`FileInfo`] capture date.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ExifTags {
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub orientation: Option<u32>,
    pub exposure_time: Option<String>,
    pub f_number: Option<String>,
    pub iso_speed: Option<u32>,
    pub focal_length: Option<String>,
    pub date_time_original: Option<String>,
    pub date_time: Option<String>,
}

impl ExifTags {
    fn from_exif(exif: &exif::Exif) -> Self {
        Self {
            make: ascii_value(exif, Tag::Make),
            model: ascii_value(exif, Tag::Model),
            software: ascii_value(exif, Tag::Software),
            orientation: uint_value(exif, Tag::Orientation),
            exposure_time: display_value(exif, Tag::ExposureTime),
            f_number: display_value(exif, Tag::FNumber),
            iso_speed: uint_value(exif, Tag::PhotographicSensitivity),
            focal_length: display_value(exif, Tag::FocalLength),
            date_time_original: ascii_value(exif, Tag::DateTimeOriginal),
            date_time: ascii_value(exif, Tag::DateTime),
        }
    }

    /// Capture timestamp: `DateTimeOriginal`, falling back to `DateTime`.
    fn capture_date(&self) -> Option<String> {
        self.date_time_original
            .as_deref()
            .or(self.date_time.as_deref())
            .and_then(exif_datetime_to_iso)
    }
}

fn ascii_value(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        exif::Value::Ascii(values) => values
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => Some(field.display_value().to_string()),
    }
}

fn uint_value(exif: &exif::Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

fn display_value(exif: &exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|field| field.display_value().to_string())
}

/// Convert an EXIF `YYYY:MM:DD HH:MM:SS` timestamp to ISO-8601.
fn exif_datetime_to_iso(raw: &str) -> Option<String> {
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
    Some(parsed.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Best-effort EXIF parse. Absence or malformed data yields `None`.
fn parse_exif(data: &[u8]) -> Option<exif::Exif> {
    let mut cursor = Cursor::new(data);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Some(exif),
        Err(exif::Error::NotFound(_)) => None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse EXIF data");
            None
        }
    }
}

/// Decode the raster data, downscale it and re-encode as a PNG `data:` URL.
fn render_thumbnail(file: &UploadFile) -> ReadResult<String> {
    let reader = ImageReader::new(Cursor::new(file.data.as_ref())).with_guessed_format()?;
    let img = reader.decode().map_err(|source| ReadError::Decode {
        mime: file.content_type.clone(),
        source,
    })?;

    let thumbnail = img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
    let mut buffer = Vec::new();
    thumbnail
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|source| ReadError::Decode {
            mime: file.content_type.clone(),
            source,
        })?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&buffer)))
}

/// Read preview metadata from an uploaded image.
pub async fn read_image(file: &UploadFile) -> ReadResult<FileInfo> {
    // Browsers render SVG natively; embed the markup as-is. No EXIF either.
    if file.content_type == SVG_MIME {
        return Ok(FileInfo {
            date: None,
            preview: format!("data:{};base64,{}", SVG_MIME, BASE64.encode(&file.data)),
            tags: None,
        });
    }

    let tags = parse_exif(&file.data).map(|exif| ExifTags::from_exif(&exif));
    let date = tags.as_ref().and_then(ExifTags::capture_date);
    let preview = render_thumbnail(file)?;

    Ok(FileInfo {
        date,
        preview,
        tags,
    })
}
