use crate::error::{io_err, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::info;

pub const LOCAL_PROPERTIES: &str = "local.properties";

/// Comment line that precedes the `ndk.dir` entry owned by this tool.
pub const MANAGED_MARKER: &str = "# ndk.dir managed by v8-prep";

static NDK_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*ndk\.dir\s*=").unwrap());

/// Point `ndk.dir` at `ndk_dir`.
///
/// The line after each managed marker is replaced with the new entry (or
/// added, when the marker ends the file), any other active `ndk.dir`
/// assignment is commented out, and a managed block is appended when none
/// exists yet. Running this on its own output only refreshes the managed
/// entry.
pub fn apply_ndk_dir<S: AsRef<str>>(
    lines: &[S],
    ndk_dir: &str,
) -> Vec<String> {
    let entry = format!("ndk.dir={}", ndk_dir);
    let mut out = Vec::with_capacity(lines.len() + 2);
    let mut managed = false;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].as_ref();
        if line.trim() == MANAGED_MARKER {
            // a marker on the last line is completed with the entry
            out.push(line.to_owned());
            out.push(entry.clone());
            managed = true;
            i += 2;
            continue;
        }

        if NDK_DIR.is_match(line) {
            out.push(format!("#{}", line));
        } else {
            out.push(line.to_owned());
        }
        i += 1;
    }

    if !managed {
        out.push(MANAGED_MARKER.to_owned());
        out.push(entry);
    }
    out
}

/// Rewrite `local.properties` in the given directory, creating it if needed.
pub fn update_local_properties(dir: &Path, ndk_dir: &str) -> Result<()> {
    let path = dir.join(LOCAL_PROPERTIES);
    let data = if path.exists() {
        std::fs::read_to_string(&path).map_err(io_err(&path))?
    } else {
        String::new()
    };

    let lines: Vec<&str> = data.lines().collect();
    let mut out = apply_ndk_dir(&lines, ndk_dir).join("\n");
    out.push('\n');
    std::fs::write(&path, out).map_err(io_err(&path))?;

    info!("set ndk.dir in {}", path.display());
    Ok(())
}
