use crate::metadata::ProbeError;
use crate::naming::NameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Phase of the two-phase move that failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoveStage {
    /// source -> temporary name
    Stage,
    /// temporary name -> destination
    Finalize,
}

impl fmt::Display for MoveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveStage::Stage => f.write_str("move to temporary name"),
            MoveStage::Finalize => f.write_str("move to destination"),
        }
    }
}

/// Reason a single file was not renamed. Never aborts a batch.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("no metadata or this format is not supported")]
    UnsupportedFormat,
    #[error("no date and time information found")]
    DateNotFound,
    #[error("{field} value {value:?} does not match {pattern}")]
    TimestampParse {
        field: &'static str,
        value: String,
        pattern: &'static str,
        #[source]
        source: chrono::ParseError,
    },
    #[error("cannot build a file name")]
    Naming(#[from] NameError),
    #[error("destination already exists: {}", .0.display())]
    DestinationTaken(PathBuf),
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to {stage}: {} -> {}", from.display(), to.display())]
    Move {
        stage: MoveStage,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedFormat,
    DateNotFound,
    TimestampParse,
    Naming,
    Filesystem,
}

impl FileError {
    pub fn from_probe(path: PathBuf, err: ProbeError) -> Self {
        match err {
            ProbeError::Unsupported | ProbeError::Malformed(_) => FileError::UnsupportedFormat,
            ProbeError::Io(source) => FileError::Read { path, source },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FileError::UnsupportedFormat => FailureKind::UnsupportedFormat,
            FileError::DateNotFound => FailureKind::DateNotFound,
            FileError::TimestampParse { .. } => FailureKind::TimestampParse,
            FileError::Naming(_) => FailureKind::Naming,
            FileError::DestinationTaken(_)
            | FileError::Read { .. }
            | FileError::Write { .. }
            | FileError::Move { .. } => FailureKind::Filesystem,
        }
    }

    /// The file could not be dated at all, as opposed to failing later on.
    pub fn is_unresolvable(&self) -> bool {
        matches!(
            self,
            FileError::UnsupportedFormat | FileError::DateNotFound
        )
    }

    /// Full message including the underlying causes.
    pub fn describe(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
