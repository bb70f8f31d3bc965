use crate::error::{io_err, Error, Result};
use crate::util::APPLICATION_MK;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An `# allow-stl` comment exempts an `APP_STL` line from validation.
static EXEMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^APP_STL\b.*#\s*allow-stl\b").unwrap());

static SHARED_STL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^APP_STL\s*(=|:=|\?=|\+=)\s*c\+\+_shared\b").unwrap()
});

/// Return the first `APP_STL` line that does not select the shared STL.
pub fn check_lines<'a, I>(lines: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || EXEMPT.is_match(trimmed) {
            continue;
        }
        if trimmed.starts_with("APP_STL") && !SHARED_STL.is_match(trimmed) {
            return Some(line);
        }
    }
    None
}

/// Check the `Application.mk` in the given directory.
pub fn validate(dir: &Path) -> Result<()> {
    let path = dir.join(APPLICATION_MK);
    let data = std::fs::read_to_string(&path).map_err(io_err(&path))?;
    match check_lines(data.lines()) {
        Some(line) => Err(Error::Stl {
            path,
            line: line.trim().to_owned(),
        }),
        None => {
            debug!("{}: ok", path.display());
            Ok(())
        }
    }
}

/// Check every `Application.mk`, stopping at the first failure.
pub fn validate_all(dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        validate(dir)?;
    }
    info!("APP_STL is c++_shared in {} {}", dirs.len(), APPLICATION_MK);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_mk(root: &Path, rel: &str, content: &str) -> PathBuf {
        let dir = root.join(rel);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(APPLICATION_MK), content).unwrap();
        dir
    }

    #[test]
    fn test_shared_stl_passes() {
        assert_eq!(check_lines(["APP_STL := c++_shared"]), None);
        assert_eq!(check_lines(["  APP_STL=c++_shared # runtime"]), None);
        assert_eq!(check_lines(["APP_ABI := arm64-v8a"]), None);
    }

    #[test]
    fn test_other_stl_fails() {
        let lines = ["APP_ABI := all", "APP_STL := gnustl_static"];
        assert_eq!(check_lines(lines), Some("APP_STL := gnustl_static"));
        assert_eq!(
            check_lines(["APP_STL := c++_static"]),
            Some("APP_STL := c++_static")
        );
    }

    #[test]
    fn test_comments_and_exemptions_skipped() {
        let lines = [
            "# APP_STL := gnustl_static",
            "APP_STL := c++_static # allow-stl",
            "APP_STL := c++_shared",
        ];
        assert_eq!(check_lines(lines), None);
    }

    #[test]
    fn test_validate_reports_file_and_line() {
        let root = TempDir::new().unwrap();
        let good = write_mk(root.path(), "good", "APP_STL := c++_shared\n");
        let bad = write_mk(
            root.path(),
            "bad",
            "APP_PLATFORM := android-21\nAPP_STL := gnustl_static\n",
        );

        assert!(validate(&good).is_ok());
        match validate_all(&[good, bad.clone()]) {
            Err(Error::Stl { path, line }) => {
                assert_eq!(path, bad.join(APPLICATION_MK));
                assert_eq!(line, "APP_STL := gnustl_static");
            }
            other => panic!("expected STL error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_all_empty() {
        assert!(validate_all(&[]).is_ok());
    }
}
