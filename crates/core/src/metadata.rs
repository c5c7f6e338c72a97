use crate::exif_reader::read_image_metadata;
use crate::gps::GpsPosition;
use crate::quicktime_reader::read_video_metadata;
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

/// EXIF capture time of still images.
pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
/// TIFF modification time, present in files that lack `DateTimeOriginal`.
pub const DATE_TIME: &str = "DateTime";
/// QuickTime creation date written by Apple devices into the `mdta` key list.
pub const CREATION_DATE: &str = "com.apple.quicktime.creationdate";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("format is not supported")]
    Unsupported,
    #[error("metadata is malformed: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

impl MetadataField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    pub(crate) fields: Vec<MetadataField>,
    pub(crate) gps: Option<GpsPosition>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub(crate) fields: Vec<MetadataField>,
}

/// Decoded metadata of one file, tagged by the decoder that accepted it.
#[derive(Debug, Clone)]
pub enum MediaMetadata {
    Image(ImageMetadata),
    Video(VideoMetadata),
}

impl MediaMetadata {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaMetadata::Image(_) => MediaKind::Image,
            MediaMetadata::Video(_) => MediaKind::Video,
        }
    }

    pub fn fields(&self) -> &[MetadataField] {
        match self {
            MediaMetadata::Image(image) => &image.fields,
            MediaMetadata::Video(video) => &video.fields,
        }
    }

    /// Returns the first non-empty value stored under `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.fields()
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn gps(&self) -> Option<GpsPosition> {
        match self {
            MediaMetadata::Image(image) => image.gps,
            MediaMetadata::Video(_) => None,
        }
    }
}

/// Decodes `path` as an image first and falls back to the video decoder when
/// the image decoder does not recognise the container.
pub fn probe_media(path: &Path) -> Result<MediaMetadata, ProbeError> {
    probe_media_with(path, UTF_8)
}

/// Like [`probe_media`], decoding EXIF text values with `encoding`.
pub fn probe_media_with(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<MediaMetadata, ProbeError> {
    match read_image_metadata(path, encoding) {
        Ok(image) => return Ok(MediaMetadata::Image(image)),
        Err(ProbeError::Unsupported) => {}
        Err(err) => return Err(err),
    }
    read_video_metadata(path).map(MediaMetadata::Video)
}
