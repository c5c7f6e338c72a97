//! Byte-level builders for the media files used in tests.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;

/// `mvhd` creation time written by [`quicktime_with_keys`], as the reader
/// formats it.
pub const MOVIE_HEADER_CREATION_TIME: &str = "2022-04-28T14:13:20+0000";
const MOVIE_HEADER_CREATION_SECONDS: u32 = 3_734_000_000;

pub fn jpeg_with_dates(original: Option<&str>, date_time: Option<&str>) -> Vec<u8> {
    let mut fields = vec![ascii_field(Tag::Make, "FUJIFILM")];
    if let Some(value) = original {
        fields.push(ascii_field(Tag::DateTimeOriginal, value));
    }
    if let Some(value) = date_time {
        fields.push(ascii_field(Tag::DateTime, value));
    }
    jpeg_with_fields(&fields)
}

/// 35°39'0" N, 139°45'0" W.
pub fn jpeg_with_gps() -> Vec<u8> {
    let fields = vec![
        ascii_field(Tag::GPSLatitudeRef, "N"),
        rational_field(Tag::GPSLatitude, [35, 39, 0]),
        ascii_field(Tag::GPSLongitudeRef, "W"),
        rational_field(Tag::GPSLongitude, [139, 45, 0]),
    ];
    jpeg_with_fields(&fields)
}

/// `Make` stored as raw, possibly non-UTF-8 bytes.
pub fn jpeg_with_make(make: &[u8]) -> Vec<u8> {
    jpeg_with_fields(&[Field {
        tag: Tag::Make,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![make.to_vec()]),
    }])
}

pub fn jpeg_without_exif() -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub fn quicktime_with_keys(entries: &[(&str, &str)]) -> Vec<u8> {
    quicktime(meta_atom(entries, false))
}

/// Same as [`quicktime_with_keys`] but with an ISO-style `meta` atom that
/// starts with a version/flags word.
pub fn quicktime_with_full_meta(entries: &[(&str, &str)]) -> Vec<u8> {
    quicktime(meta_atom(entries, true))
}

fn ascii_field(tag: Tag, value: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![value.as_bytes().to_vec()]),
    }
}

fn rational_field(tag: Tag, dms: [u32; 3]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(dms.iter().map(|&num| Rational { num, denom: 1 }).collect()),
    }
}

fn jpeg_with_fields(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("exif writer");
    let tiff = tiff.into_inner();

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = u16::try_from(2 + 6 + tiff.len()).expect("exif segment fits");
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

fn atom(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(&(body.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    out
}

fn quicktime(meta: Vec<u8>) -> Vec<u8> {
    let mut ftyp = Vec::new();
    ftyp.extend_from_slice(b"qt  ");
    ftyp.extend_from_slice(&0x0200u32.to_be_bytes());
    ftyp.extend_from_slice(b"qt  ");

    let mut mvhd = vec![0u8; 100];
    mvhd[4..8].copy_from_slice(&MOVIE_HEADER_CREATION_SECONDS.to_be_bytes());
    mvhd[8..12].copy_from_slice(&MOVIE_HEADER_CREATION_SECONDS.to_be_bytes());

    let mut moov = atom(b"mvhd", &mvhd);
    moov.extend_from_slice(&meta);

    let mut out = atom(b"ftyp", &ftyp);
    out.extend_from_slice(&atom(b"wide", &[]));
    out.extend_from_slice(&atom(b"mdat", &[0u8; 32]));
    out.extend_from_slice(&atom(b"moov", &moov));
    out
}

fn meta_atom(entries: &[(&str, &str)], with_version: bool) -> Vec<u8> {
    let mut hdlr = vec![0u8; 8];
    hdlr.extend_from_slice(b"mdta");
    hdlr.extend_from_slice(&[0u8; 13]);

    let mut keys = vec![0u8; 4];
    keys.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    let mut ilst = Vec::new();
    for (index, (name, value)) in entries.iter().enumerate() {
        keys.extend_from_slice(&(name.len() as u32 + 8).to_be_bytes());
        keys.extend_from_slice(b"mdta");
        keys.extend_from_slice(name.as_bytes());

        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(value.as_bytes());
        let item_kind = (index as u32 + 1).to_be_bytes();
        ilst.extend_from_slice(&atom(&item_kind, &atom(b"data", &data)));
    }

    let mut body = if with_version { vec![0u8; 4] } else { Vec::new() };
    body.extend_from_slice(&atom(b"hdlr", &hdlr));
    body.extend_from_slice(&atom(b"keys", &keys));
    body.extend_from_slice(&atom(b"ilst", &ilst));
    atom(b"meta", &body)
}
