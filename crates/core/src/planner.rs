use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Destinations handed out so far in one run. Several sources may render to
/// the same name (burst shots within one second) before any of them is on
/// disk.
#[derive(Debug, Default)]
pub struct ClaimSet {
    claimed: HashSet<PathBuf>,
}

impl ClaimSet {
    pub fn contains(&self, path: &Path) -> bool {
        self.claimed.contains(path)
    }

    pub fn claim(&mut self, path: PathBuf) -> bool {
        self.claimed.insert(path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub base_name: String,
    /// Original extension including the dot, or empty.
    pub extension: String,
    pub destination: PathBuf,
}

impl RenamePlan {
    /// The file already carries the name it would be given.
    pub fn is_unchanged(&self) -> bool {
        self.source == self.destination
    }
}

/// `.jpg` for `IMG_0001.jpg`; case is preserved.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Destination `base_name + extension` in `directory`, without any collision
/// check.
pub fn candidate_path(directory: &Path, base_name: &str, extension: &str) -> PathBuf {
    directory.join(format!("{}{}", base_name, extension))
}

/// Picks `base_name + extension` in `directory`, or the first free
/// `base_name_N + extension` for N = 1, 2, …, and claims it.
pub fn resolve_collision(
    directory: &Path,
    source: &Path,
    base_name: &str,
    extension: &str,
    claims: &mut ClaimSet,
) -> RenamePlan {
    let mut candidate = candidate_path(directory, base_name, extension);
    let mut n = 1usize;
    while !is_available(&candidate, source, claims) {
        candidate = candidate_path(directory, &format!("{}_{}", base_name, n), extension);
        n += 1;
    }

    claims.claim(candidate.clone());
    RenamePlan {
        source: source.to_path_buf(),
        base_name: base_name.to_string(),
        extension: extension.to_string(),
        destination: candidate,
    }
}

fn is_available(candidate: &Path, source: &Path, claims: &ClaimSet) -> bool {
    if claims.contains(candidate) {
        return false;
    }
    if candidate == source {
        return true;
    }
    !path_exists(candidate)
}

/// Like `Path::exists` but also true for dangling symlinks.
pub(crate) fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
