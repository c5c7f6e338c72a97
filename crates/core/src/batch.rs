use crate::apply::{execute, ExecuteOutcome};
use crate::error::{FailureKind, FileError};
use crate::metadata::probe_media;
use crate::naming::{NameFormat, DEFAULT_TIME_STAMP};
use crate::planner::{candidate_path, extension_of, resolve_collision, ClaimSet, RenamePlan};
use crate::resolver::resolve_capture_timestamp;
use crate::sidecar::is_sidecar;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub directory: PathBuf,
    pub prefix: String,
    pub postfix: String,
    pub time_stamp: String,
    pub dry_run: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            prefix: String::new(),
            postfix: String::new(),
            time_stamp: DEFAULT_TIME_STAMP.to_string(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedRename {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchResult {
    pub dry_run: bool,
    pub scanned: usize,
    pub filtered: usize,
    pub renamed: usize,
    pub unchanged: usize,
    /// Every rename performed, or in a dry run every rename that would be
    /// attempted (before collision numbering).
    pub renames: Vec<PlannedRename>,
    pub failures: Vec<FileFailure>,
}

/// Terminal state of one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Directory, symlink, other non-regular entry or `.metadata` sidecar.
    Filtered,
    /// Unsupported format or no date field.
    Unresolvable,
    Unchanged,
    Done,
    Failed,
}

/// Renames the files of one directory, one at a time, in path order.
pub struct BatchRenamer {
    options: RenameOptions,
    format: NameFormat,
    claims: ClaimSet,
    result: BatchResult,
}

impl BatchRenamer {
    /// Fails before any file is touched if the time stamp pattern is invalid.
    pub fn new(options: RenameOptions) -> Result<Self> {
        let format = NameFormat::new(&options.time_stamp, &options.prefix, &options.postfix)
            .with_context(|| format!("invalid time stamp pattern: {}", options.time_stamp))?;
        let result = BatchResult {
            dry_run: options.dry_run,
            ..BatchResult::default()
        };
        Ok(Self {
            options,
            format,
            claims: ClaimSet::default(),
            result,
        })
    }

    pub fn run(mut self) -> Result<BatchResult> {
        let entries = list_directory(&self.options.directory)?;
        for (path, file_type) in entries {
            let state = self.process(&path, file_type);
            debug!("{}: {:?}", path.display(), state);
        }
        Ok(self.result)
    }

    fn process(&mut self, path: &Path, file_type: FileType) -> FileState {
        self.result.scanned += 1;
        if !file_type.is_file() || is_sidecar(path) {
            self.result.filtered += 1;
            return FileState::Filtered;
        }

        match self.rename_file(path) {
            Ok(ExecuteOutcome::Renamed) => {
                self.result.renamed += 1;
                FileState::Done
            }
            Ok(ExecuteOutcome::Simulated) => FileState::Done,
            Ok(ExecuteOutcome::Unchanged) => {
                if !self.options.dry_run {
                    self.result.unchanged += 1;
                }
                FileState::Unchanged
            }
            Err(err) => {
                let reason = err.describe();
                warn!("{} cannot be processed: {}", path.display(), reason);
                self.result.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    kind: err.kind(),
                    reason,
                });
                if err.is_unresolvable() {
                    FileState::Unresolvable
                } else {
                    FileState::Failed
                }
            }
        }
    }

    fn rename_file(&mut self, path: &Path) -> Result<ExecuteOutcome, FileError> {
        let metadata =
            probe_media(path).map_err(|err| FileError::from_probe(path.to_path_buf(), err))?;
        let timestamp = resolve_capture_timestamp(&metadata)?;
        let base_name = self.format.render(&timestamp)?;
        let extension = extension_of(path);
        let directory = self.options.directory.as_path();

        let plan = if self.options.dry_run {
            RenamePlan {
                source: path.to_path_buf(),
                destination: candidate_path(directory, &base_name, &extension),
                base_name,
                extension,
            }
        } else {
            resolve_collision(directory, path, &base_name, &extension, &mut self.claims)
        };

        let outcome = execute(&plan, self.options.dry_run)?;
        match outcome {
            ExecuteOutcome::Renamed => info!(
                "{} -> {} ({})",
                plan.source.display(),
                plan.destination.display(),
                timestamp.field
            ),
            ExecuteOutcome::Unchanged => debug!("{} already named", plan.source.display()),
            ExecuteOutcome::Simulated => {}
        }
        if outcome != ExecuteOutcome::Unchanged {
            self.result.renames.push(PlannedRename {
                source: plan.source,
                destination: plan.destination,
            });
        }
        Ok(outcome)
    }
}

pub fn rename_directory(options: RenameOptions) -> Result<BatchResult> {
    BatchRenamer::new(options)?.run()
}

/// Snapshot of the directory, sorted by path. Symlinks are reported as
/// symlinks, not as their targets.
pub(crate) fn list_directory(dir: &Path) -> Result<Vec<(PathBuf, FileType)>> {
    let mut out = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("cannot read directory: {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("cannot read entry in: {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("cannot stat: {}", entry.path().display()))?;
        out.push((entry.path(), file_type));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
