mod apply;
mod batch;
mod config;
mod error;
mod exif_reader;
#[cfg(test)]
mod fixtures;
mod gps;
mod metadata;
mod naming;
mod planner;
mod quicktime_reader;
mod resolver;
mod sanitize;
mod sidecar;

pub use apply::{execute, ExecuteOutcome, TEMP_PREFIX};
pub use batch::{
    rename_directory, BatchRenamer, BatchResult, FileFailure, FileState, PlannedRename,
    RenameOptions,
};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use error::{FailureKind, FileError, MoveStage};
pub use gps::{maps_line, GpsPosition};
pub use metadata::{
    probe_media, probe_media_with, ImageMetadata, MediaKind, MediaMetadata, MetadataField, ProbeError,
    VideoMetadata, CREATION_DATE, DATE_TIME, DATE_TIME_ORIGINAL,
};
pub use naming::{validate_time_stamp, NameError, NameFormat, DEFAULT_TIME_STAMP};
pub use planner::{candidate_path, extension_of, resolve_collision, ClaimSet, RenamePlan};
pub use resolver::{
    find_date_field, resolve_capture_timestamp, CaptureTimestamp, DateField, DATE_FIELDS,
    EXIF_DATE_PATTERN, QUICKTIME_DATE_PATTERN,
};
pub use sidecar::{
    dump_metadata, encoding_for_label, is_sidecar, render_metadata, sidecar_path, DumpEntry, DumpOptions, DumpReport,
    SIDECAR_EXTENSION,
};
