use crate::error::{FileError, MoveStage};
use crate::planner::{path_exists, RenamePlan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// File name prefix of the intermediate name used between the two phases.
pub const TEMP_PREFIX: &str = ".mrename-tmp-";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteOutcome {
    Renamed,
    Unchanged,
    Simulated,
}

/// Moves `plan.source` to `plan.destination` via a temporary name in the same
/// directory.
///
/// If the second move fails the file stays under its temporary name and the
/// returned error names that path; nothing is rolled back or deleted.
pub fn execute(plan: &RenamePlan, dry_run: bool) -> Result<ExecuteOutcome, FileError> {
    if plan.is_unchanged() {
        return Ok(ExecuteOutcome::Unchanged);
    }
    if dry_run {
        debug!(
            "dry-run: {} -> {}",
            plan.source.display(),
            plan.destination.display()
        );
        return Ok(ExecuteOutcome::Simulated);
    }
    if path_exists(&plan.destination) {
        return Err(FileError::DestinationTaken(plan.destination.clone()));
    }

    let temp_path = temp_path_for(&plan.source);
    fs::rename(&plan.source, &temp_path).map_err(|source| FileError::Move {
        stage: MoveStage::Stage,
        from: plan.source.clone(),
        to: temp_path.clone(),
        source,
    })?;

    if let Err(source) = fs::rename(&temp_path, &plan.destination) {
        warn!(
            "{} is kept as {} after a failed move",
            plan.source.display(),
            temp_path.display()
        );
        return Err(FileError::Move {
            stage: MoveStage::Finalize,
            from: temp_path,
            to: plan.destination.clone(),
            source,
        });
    }

    Ok(ExecuteOutcome::Renamed)
}

fn temp_path_for(source: &Path) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    loop {
        let candidate = parent.join(format!("{}{}", TEMP_PREFIX, Uuid::new_v4().simple()));
        if !path_exists(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use std::fs;
    use tempfile::tempdir;

    fn plan(source: PathBuf, destination: PathBuf) -> RenamePlan {
        RenamePlan {
            source,
            base_name: "unused".to_string(),
            extension: ".jpg".to_string(),
            destination,
        }
    }

    fn has_temp_file(dir: &Path) -> bool {
        fs::read_dir(dir)
            .expect("read dir")
            .flatten()
            .any(|entry| entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
    }

    #[test]
    fn moves_file_and_leaves_no_temp_behind() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("IMG_0001.jpg");
        let destination = temp.path().join("2022-05-01 10-00-00.jpg");
        fs::write(&source, b"pixels").expect("write source");

        let outcome = execute(&plan(source.clone(), destination.clone()), false)
            .expect("rename must succeed");
        assert_eq!(outcome, ExecuteOutcome::Renamed);
        assert!(!source.exists());
        assert_eq!(fs::read(&destination).expect("read"), b"pixels");
        assert!(!has_temp_file(temp.path()));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("IMG_0001.jpg");
        let destination = temp.path().join("renamed.jpg");
        fs::write(&source, b"pixels").expect("write source");

        let outcome = execute(&plan(source.clone(), destination.clone()), true)
            .expect("dry run must succeed");
        assert_eq!(outcome, ExecuteOutcome::Simulated);
        assert!(source.exists());
        assert!(!destination.exists());
    }

    #[test]
    fn unchanged_plan_is_a_no_op() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("2022-05-01 10-00-00.jpg");
        fs::write(&source, b"pixels").expect("write source");

        let outcome = execute(&plan(source.clone(), source.clone()), false).expect("no-op");
        assert_eq!(outcome, ExecuteOutcome::Unchanged);
        assert!(source.exists());
    }

    #[test]
    fn dry_run_of_unchanged_plan_is_not_simulated() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("2022-05-01 10-00-00.jpg");
        fs::write(&source, b"pixels").expect("write source");

        let outcome = execute(&plan(source.clone(), source.clone()), true).expect("no-op");
        assert_eq!(outcome, ExecuteOutcome::Unchanged);
    }

    #[test]
    fn temp_name_length_does_not_depend_on_source_name() {
        let temp = tempdir().expect("tempdir");
        let short = temp_path_for(&temp.path().join("a.jpg"));
        let long = temp_path_for(&temp.path().join(format!("{}.jpg", "x".repeat(240))));

        let len = |path: &Path| path.file_name().expect("name").len();
        assert_eq!(len(&short), len(&long));
        assert_eq!(len(&long), TEMP_PREFIX.len() + 32);
        assert_eq!(long.parent(), Some(temp.path()));
    }

    #[test]
    fn refuses_to_overwrite_existing_destination() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("IMG_0001.jpg");
        let destination = temp.path().join("taken.jpg");
        fs::write(&source, b"new").expect("write source");
        fs::write(&destination, b"old").expect("write destination");

        let err = execute(&plan(source.clone(), destination.clone()), false)
            .expect_err("must not overwrite");
        assert!(matches!(err, FileError::DestinationTaken(_)));
        assert_eq!(fs::read(&source).expect("read"), b"new");
        assert_eq!(fs::read(&destination).expect("read"), b"old");
    }

    #[test]
    fn failed_second_phase_keeps_temp_file() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("IMG_0001.jpg");
        let destination = temp.path().join("missing-dir").join("renamed.jpg");
        fs::write(&source, b"pixels").expect("write source");

        let err = execute(&plan(source.clone(), destination), false)
            .expect_err("second phase must fail");
        assert_eq!(err.kind(), FailureKind::Filesystem);
        let (stage, from) = match err {
            FileError::Move { stage, from, .. } => (stage, from),
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(stage, MoveStage::Finalize);
        assert!(!source.exists());
        assert_eq!(fs::read(&from).expect("temp file holds the data"), b"pixels");
        assert!(has_temp_file(temp.path()));
    }

    #[test]
    fn failed_first_phase_keeps_source() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("vanished.jpg");
        let destination = temp.path().join("renamed.jpg");

        let err = execute(&plan(source, destination), false).expect_err("source is missing");
        assert!(matches!(
            err,
            FileError::Move {
                stage: MoveStage::Stage,
                ..
            }
        ));
        assert!(!has_temp_file(temp.path()));
    }
}
