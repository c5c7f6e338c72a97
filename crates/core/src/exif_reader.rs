use crate::gps::GpsPosition;
use crate::metadata::{ImageMetadata, MetadataField, ProbeError};
use encoding_rs::Encoding;
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Reads the primary-IFD EXIF fields of a JPEG, HEIF, TIFF, PNG or WebP file.
///
/// Containers the EXIF reader does not recognise yield
/// [`ProbeError::Unsupported`]; a recognised image without an EXIF block
/// yields empty metadata. ASCII values are decoded with `encoding`.
pub fn read_image_metadata(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<ImageMetadata, ProbeError> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut buf) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(ImageMetadata::default()),
        Err(exif::Error::Io(err)) if err.kind() != io::ErrorKind::UnexpectedEof => {
            return Err(ProbeError::Io(err))
        }
        Err(_) => return Err(ProbeError::Unsupported),
    };

    let fields = exif
        .fields()
        .filter(|field| field.ifd_num == In::PRIMARY)
        .map(|field| MetadataField::new(field.tag.to_string(), field_text(&exif, field, encoding)))
        .collect();

    Ok(ImageMetadata {
        fields,
        gps: read_gps(&exif),
    })
}

fn field_text(exif: &Exif, field: &Field, encoding: &'static Encoding) -> String {
    // display_value() reformats date fields and quotes strings; keep ASCII raw.
    match &field.value {
        Value::Ascii(parts) if !parts.is_empty() => parts
            .iter()
            .map(|part| {
                encoding
                    .decode_without_bom_handling(part)
                    .0
                    .trim_end_matches('\0')
                    .trim()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().with_unit(exif).to_string(),
    }
}

fn read_gps(exif: &Exif) -> Option<GpsPosition> {
    let lat = dms(exif, Tag::GPSLatitude)?;
    let lng = dms(exif, Tag::GPSLongitude)?;
    let lat_ref = ascii(exif, Tag::GPSLatitudeRef)?;
    let lng_ref = ascii(exif, Tag::GPSLongitudeRef)?;
    GpsPosition::from_dms(lat, &lat_ref, lng, &lng_ref)
}

fn dms(exif: &Exif, tag: Tag) -> Option<[f64; 3]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) if values.len() >= 3 => Some([
            values[0].to_f64(),
            values[1].to_f64(),
            values[2].to_f64(),
        ]),
        _ => None,
    }
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|part| String::from_utf8_lossy(part).trim().to_string()),
        _ => None,
    }
}
