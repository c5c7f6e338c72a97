use crate::metadata::{MetadataField, ProbeError, VideoMetadata};
use chrono::DateTime;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const TOP_LEVEL_ATOMS: &[[u8; 4]] = &[
    *b"ftyp", *b"moov", *b"mdat", *b"wide", *b"free", *b"skip", *b"pnot", *b"uuid",
];
const MAX_MOOV_LEN: u64 = 64 * 1024 * 1024;
/// Seconds between 1904-01-01 and 1970-01-01.
const QUICKTIME_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Reads the `moov` atom of a QuickTime or MP4 file and exposes the `mvhd`
/// timestamps plus every `mdta` key/value pair as fields.
pub fn read_video_metadata(path: &Path) -> Result<VideoMetadata, ProbeError> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let moov = match read_moov(&mut reader, len) {
        Ok(Some(moov)) => moov,
        Ok(None) => return Err(ProbeError::Unsupported),
        Err(ProbeError::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ProbeError::Unsupported)
        }
        Err(err) => return Err(err),
    };

    let mut fields = Vec::new();
    for (kind, body) in atoms(&moov) {
        match &kind {
            b"mvhd" => fields.extend(movie_header_fields(body)),
            b"meta" => fields.extend(mdta_fields(body)?),
            _ => {}
        }
    }
    Ok(VideoMetadata { fields })
}

fn read_moov<R: Read + Seek>(reader: &mut R, len: u64) -> Result<Option<Vec<u8>>, ProbeError> {
    let mut offset = 0u64;
    while offset + 8 <= len {
        reader.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let kind = [header[4], header[5], header[6], header[7]];
        if offset == 0 && !TOP_LEVEL_ATOMS.contains(&kind) {
            return Ok(None);
        }

        let mut size = u64::from(u32::from_be_bytes([header[0], header[1], header[2], header[3]]));
        let mut header_len = 8u64;
        if size == 1 {
            let mut ext = [0u8; 8];
            reader.read_exact(&mut ext)?;
            size = u64::from_be_bytes(ext);
            header_len = 16;
        } else if size == 0 {
            size = len - offset;
        }
        if size < header_len || offset.saturating_add(size) > len {
            return Err(ProbeError::Malformed(format!(
                "atom {} at offset {} has invalid size {}",
                String::from_utf8_lossy(&kind),
                offset,
                size
            )));
        }

        if &kind == b"moov" {
            let body_len = size - header_len;
            if body_len > MAX_MOOV_LEN {
                return Err(ProbeError::Malformed(format!(
                    "moov atom is too large ({} bytes)",
                    body_len
                )));
            }
            let mut body = vec![0u8; body_len as usize];
            reader.read_exact(&mut body)?;
            return Ok(Some(body));
        }
        offset += size;
    }
    Ok(None)
}

/// Iterates child atoms of an in-memory atom body; stops at the first
/// truncated header.
fn atoms<'a>(data: &'a [u8]) -> impl Iterator<Item = ([u8; 4], &'a [u8])> + 'a {
    let mut rest = data;
    std::iter::from_fn(move || {
        if rest.len() < 8 {
            return None;
        }
        let size = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let kind = [rest[4], rest[5], rest[6], rest[7]];
        let (header_len, size) = match size {
            0 => (8, rest.len()),
            1 => {
                let ext = rest.get(8..16)?;
                let size = u64::from_be_bytes(ext.try_into().ok()?);
                (16, usize::try_from(size).ok()?)
            }
            size => (8, size),
        };
        if size < header_len || size > rest.len() {
            return None;
        }
        let body = &rest[header_len..size];
        rest = &rest[size..];
        Some((kind, body))
    })
}

fn movie_header_fields(body: &[u8]) -> Vec<MetadataField> {
    let Some(&version) = body.first() else {
        return Vec::new();
    };
    let (created, modified) = if version == 1 {
        (read_u64(body, 4), read_u64(body, 12))
    } else {
        (
            read_u32(body, 4).map(u64::from),
            read_u32(body, 8).map(u64::from),
        )
    };

    let mut fields = Vec::new();
    if let Some(value) = created.and_then(format_quicktime_time) {
        fields.push(MetadataField::new("CreationTime", value));
    }
    if let Some(value) = modified.and_then(format_quicktime_time) {
        fields.push(MetadataField::new("ModificationTime", value));
    }
    fields
}

fn format_quicktime_time(seconds: u64) -> Option<String> {
    if seconds == 0 {
        return None;
    }
    let unix = i64::try_from(seconds).ok()?.checked_sub(QUICKTIME_EPOCH_OFFSET)?;
    let utc = DateTime::from_timestamp(unix, 0)?;
    Some(utc.format("%Y-%m-%dT%H:%M:%S+0000").to_string())
}

fn mdta_fields(meta: &[u8]) -> Result<Vec<MetadataField>, ProbeError> {
    // QuickTime `meta` has no version/flags word; the ISO variant does.
    let body = if meta.get(4..8) == Some(b"hdlr".as_slice()) {
        meta
    } else {
        meta.get(4..).unwrap_or_default()
    };

    let mut keys = Vec::new();
    let mut items = Vec::new();
    for (kind, child) in atoms(body) {
        match &kind {
            b"keys" => keys = parse_keys(child)?,
            b"ilst" => items = parse_items(child),
            _ => {}
        }
    }

    let fields = items
        .into_iter()
        .filter_map(|(index, value)| {
            let name = keys.get(index.checked_sub(1)? as usize)?;
            Some(MetadataField::new(name.clone(), value))
        })
        .collect();
    Ok(fields)
}

fn parse_keys(body: &[u8]) -> Result<Vec<String>, ProbeError> {
    let count = read_u32(body, 4)
        .ok_or_else(|| ProbeError::Malformed("keys atom is truncated".to_string()))?;
    let mut keys = Vec::new();
    let mut offset = 8usize;
    for _ in 0..count {
        let size = read_u32(body, offset)
            .ok_or_else(|| ProbeError::Malformed("keys entry is truncated".to_string()))?
            as usize;
        let name = size
            .checked_sub(8)
            .and_then(|len| body.get(offset + 8..offset + 8 + len))
            .ok_or_else(|| ProbeError::Malformed("keys entry has invalid size".to_string()))?;
        keys.push(String::from_utf8_lossy(name).into_owned());
        offset += size;
    }
    Ok(keys)
}

fn parse_items(body: &[u8]) -> Vec<(u32, String)> {
    atoms(body)
        .filter_map(|(kind, item)| {
            let index = u32::from_be_bytes(kind);
            let value = atoms(item)
                .find(|(kind, _)| kind == b"data")
                .and_then(|(_, data)| decode_data(data))?;
            Some((index, value))
        })
        .collect()
}

fn decode_data(data: &[u8]) -> Option<String> {
    let type_code = read_u32(data, 0)? & 0x00FF_FFFF;
    let value = data.get(8..)?;
    let text = match type_code {
        1 => String::from_utf8_lossy(value).into_owned(),
        2 => {
            let units: Vec<u16> = value
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        21 => signed(value)?.to_string(),
        22 => unsigned(value)?.to_string(),
        23 => f32::from_be_bytes(value.get(..4)?.try_into().ok()?).to_string(),
        24 => f64::from_be_bytes(value.get(..8)?.try_into().ok()?).to_string(),
        _ => format!("<{} bytes>", value.len()),
    };
    Some(text.trim_end_matches('\0').to_string())
}

fn signed(value: &[u8]) -> Option<i64> {
    Some(match value.len() {
        1 => i64::from(value[0] as i8),
        2 => i64::from(i16::from_be_bytes(value.try_into().ok()?)),
        4 => i64::from(i32::from_be_bytes(value.try_into().ok()?)),
        8 => i64::from_be_bytes(value.try_into().ok()?),
        _ => return None,
    })
}

fn unsigned(value: &[u8]) -> Option<u64> {
    Some(match value.len() {
        1 => u64::from(value[0]),
        2 => u64::from(u16::from_be_bytes(value.try_into().ok()?)),
        4 => u64::from(u32::from_be_bytes(value.try_into().ok()?)),
        8 => u64::from_be_bytes(value.try_into().ok()?),
        _ => return None,
    })
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(data.get(at..at + 4)?.try_into().ok()?))
}

fn read_u64(data: &[u8], at: usize) -> Option<u64> {
    Some(u64::from_be_bytes(data.get(at..at + 8)?.try_into().ok()?))
}
