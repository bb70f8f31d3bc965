use crate::error::{io_err, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Marks a directory whose `local.properties` gets an `ndk.dir` entry.
pub const GRADLE_FILE: &str = "build.gradle";

/// Marks a directory whose STL setting is validated.
pub const APPLICATION_MK: &str = "Application.mk";

/// Project directories discovered under the root path.
#[derive(Debug, Default, PartialEq)]
pub struct ProjectDirs {
    /// Directories holding a gradle build file, with nested ones removed.
    pub gradle: Vec<PathBuf>,
    /// Directories holding an NDK application makefile.
    pub ndk: Vec<PathBuf>,
}

/// Find all gradle and NDK application directories at the given path. The
/// path is searched recursively without following directory symlinks,
/// skipping anything whose path contains `vendor_path`. A missing or
/// unreadable root is an error, unreadable subdirectories are skipped.
pub fn find_project_dirs(
    path: &Path,
    vendor_path: &str,
) -> Result<ProjectDirs> {
    let mut result = ProjectDirs::default();
    find_project_dirs_rec(path, vendor_path, &mut result)?;

    result.gradle = dedup_nested(result.gradle);
    result.gradle.sort();
    result.ndk.sort();
    Ok(result)
}

fn find_project_dirs_rec(
    path: &Path,
    vendor_path: &str,
    result: &mut ProjectDirs,
) -> Result<()> {
    // everything below the vendored tree contains the same substring
    if path.to_string_lossy().contains(vendor_path) {
        return Ok(());
    }

    let mut has_gradle = false;
    let mut has_mk = false;
    for entry in std::fs::read_dir(path).map_err(io_err(path))? {
        let e = entry.map_err(io_err(path))?;
        let ft = e.file_type().map_err(io_err(e.path()))?;
        if ft.is_dir() {
            let dir = e.path();
            if let Err(err) = find_project_dirs_rec(&dir, vendor_path, result) {
                warn!("skipping {}", err);
            }
        } else if ft.is_symlink() && !e.path().is_file() {
            // directory links are not followed
            continue;
        } else if e.file_name() == GRADLE_FILE {
            has_gradle = true;
        } else if e.file_name() == APPLICATION_MK {
            has_mk = true;
        }
    }

    if has_gradle {
        result.gradle.push(path.to_owned());
    }
    if has_mk {
        result.ndk.push(path.to_owned());
    }
    Ok(())
}

/// Drop every directory whose path textually contains the path of another
/// directory in the list. This is a plain substring check, not a path
/// component check, so `/a/app` also swallows `/a/app2`.
pub fn dedup_nested(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let names: Vec<String> =
        dirs.iter().map(|d| d.to_string_lossy().into_owned()).collect();

    dirs.into_iter()
        .enumerate()
        .filter(|(i, _)| {
            !names
                .iter()
                .any(|other| *other != names[*i] && names[*i].contains(other))
        })
        .map(|(_, d)| d)
        .collect()
}
