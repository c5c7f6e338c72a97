use crate::batch::{list_directory, FileFailure};
use crate::error::FileError;
use crate::gps::maps_line;
use crate::metadata::{probe_media_with, MediaKind, MediaMetadata};
use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension of the text files written by the dump tool. The rename engine
/// never touches them.
pub const SIDECAR_EXTENSION: &str = "metadata";

pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SIDECAR_EXTENSION)
        .unwrap_or(false)
}

pub fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension(SIDECAR_EXTENSION)
}

/// `Name: value` lines followed by the `Maps:` line.
pub fn render_metadata(metadata: &MediaMetadata) -> String {
    let mut out = String::new();
    for field in metadata.fields() {
        out.push_str(&format!("{}: {}\n", field.name, field.value));
    }
    out.push_str(&maps_line(metadata.gps()));
    out.push('\n');
    out
}

/// Resolves a code page name such as `utf_8`, `cp1251` or `shift_jis`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(label.replace('_', "-").as_bytes()))
        .with_context(|| format!("unknown encoding: {label}"))
}

#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub target: PathBuf,
    /// Treat `target` as a folder and dump every regular file in it.
    pub folder: bool,
    /// Return the text only instead of writing sidecar files.
    pub display: bool,
    /// Code page of EXIF string values.
    pub encoding: &'static Encoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpEntry {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub text: String,
    pub sidecar: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DumpReport {
    pub entries: Vec<DumpEntry>,
    pub failures: Vec<FileFailure>,
}

pub fn dump_metadata(options: &DumpOptions) -> Result<DumpReport> {
    let targets = if options.folder {
        list_directory(&options.target)?
            .into_iter()
            .filter(|(path, file_type)| file_type.is_file() && !is_sidecar(path))
            .map(|(path, _)| path)
            .collect()
    } else {
        vec![options.target.clone()]
    };

    let mut report = DumpReport::default();
    for path in targets {
        match dump_file(&path, options) {
            Ok(entry) => report.entries.push(entry),
            Err(err) => {
                let reason = err.describe();
                warn!("{} cannot be processed: {}", path.display(), reason);
                report.failures.push(FileFailure {
                    kind: err.kind(),
                    path,
                    reason,
                });
            }
        }
    }
    Ok(report)
}

fn dump_file(path: &Path, options: &DumpOptions) -> Result<DumpEntry, FileError> {
    let metadata = probe_media_with(path, options.encoding)
        .map_err(|err| FileError::from_probe(path.to_path_buf(), err))?;
    let text = render_metadata(&metadata);

    let sidecar = if options.display {
        None
    } else {
        let target = sidecar_path(path);
        fs::write(&target, &text).map_err(|source| FileError::Write {
            path: target.clone(),
            source,
        })?;
        info!("wrote {}", target.display());
        Some(target)
    };

    Ok(DumpEntry {
        path: path.to_path_buf(),
        kind: metadata.kind(),
        text,
        sidecar,
    })
}
