use crate::error::FileError;
use crate::metadata::{MediaMetadata, CREATION_DATE, DATE_TIME, DATE_TIME_ORIGINAL};
use chrono::{DateTime, FixedOffset, NaiveDateTime};

pub const EXIF_DATE_PATTERN: &str = "%Y:%m:%d %H:%M:%S";
pub const QUICKTIME_DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateField {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Fields holding a capture date, in lookup priority order. Each field is
/// parsed only with its own pattern.
pub const DATE_FIELDS: [DateField; 3] = [
    DateField {
        name: DATE_TIME_ORIGINAL,
        pattern: EXIF_DATE_PATTERN,
    },
    DateField {
        name: DATE_TIME,
        pattern: EXIF_DATE_PATTERN,
    },
    DateField {
        name: CREATION_DATE,
        pattern: QUICKTIME_DATE_PATTERN,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTimestamp {
    pub field: &'static str,
    pub pattern: &'static str,
    /// Wall-clock time as recorded by the device.
    pub local: NaiveDateTime,
    /// Offset the device recorded alongside the time, if the field has one.
    pub offset: Option<FixedOffset>,
}

impl CaptureTimestamp {
    pub fn parse(field: DateField, raw: &str) -> Result<Self, FileError> {
        let parse_err = |source| FileError::TimestampParse {
            field: field.name,
            value: raw.to_string(),
            pattern: field.pattern,
            source,
        };

        if field.pattern.contains("%z") {
            let dt = DateTime::parse_from_str(raw, field.pattern).map_err(parse_err)?;
            Ok(Self {
                field: field.name,
                pattern: field.pattern,
                local: dt.naive_local(),
                offset: Some(*dt.offset()),
            })
        } else {
            let local = NaiveDateTime::parse_from_str(raw, field.pattern).map_err(parse_err)?;
            Ok(Self {
                field: field.name,
                pattern: field.pattern,
                local,
                offset: None,
            })
        }
    }
}

/// Returns the first date field present in `metadata` together with its raw
/// value.
pub fn find_date_field(metadata: &MediaMetadata) -> Option<(DateField, &str)> {
    DATE_FIELDS
        .iter()
        .find_map(|field| metadata.lookup(field.name).map(|raw| (*field, raw)))
}

pub fn resolve_capture_timestamp(metadata: &MediaMetadata) -> Result<CaptureTimestamp, FileError> {
    let (field, raw) = find_date_field(metadata).ok_or(FileError::DateNotFound)?;
    CaptureTimestamp::parse(field, raw)
}
