use crate::error::{io_err, Error, Result};
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

/// Optional settings file looked up in the root path.
pub const SETTINGS_FILE: &str = "v8-prep.toml";

/// Settings that may be overridden from `v8-prep.toml`.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Version control program used for identity lookup and cloning.
    pub git: String,
    /// Location of the vendored V8 tree relative to the root path. Any
    /// directory whose path contains this string is ignored by the scanner.
    pub vendor_path: String,
    /// Where the V8 tools checkout is cloned from.
    pub remote: Remote,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            git: "git".into(),
            vendor_path: "external/v8-tools".into(),
            remote: Remote::default(),
        }
    }
}

/// SSH remote hosting the V8 tools repository.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Remote {
    pub host: String,
    pub port: u16,
    pub repository: String,
}

impl Default for Remote {
    fn default() -> Self {
        Remote {
            host: "git.hapjs.org".into(),
            port: 29418,
            repository: "v8-tools".into(),
        }
    }
}

/// Run configuration. Built once from the command line and never mutated.
#[derive(Debug)]
pub struct Config {
    /// Root of the source tree to scan.
    pub root_path: PathBuf,
    /// Location of the V8 tools checkout.
    pub v8_tools_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Create a configuration, making both paths absolute against the
    /// current directory.
    pub fn new(
        root_path: &Path,
        v8_tools_path: &Path,
        settings: Settings,
    ) -> Result<Config> {
        Ok(Config {
            root_path: absolute(root_path)?,
            v8_tools_path: absolute(v8_tools_path)?,
            settings,
        })
    }

    /// Value written to `ndk.dir` in every managed `local.properties`.
    pub fn ndk_dir(&self) -> String {
        format!("{}/ndk", self.v8_tools_path.display())
    }
}

/// Read `v8-prep.toml` from the given directory, falling back to defaults
/// when the file does not exist.
pub fn read_settings(dir: &Path) -> Result<Settings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.is_file() {
        return Ok(Settings::default());
    }
    let data = std::fs::read_to_string(&path).map_err(io_err(&path))?;
    toml::from_str(&data).map_err(|source| Error::Config { path, source })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    // collecting components drops trailing separators and `.` segments
    Ok(std::path::absolute(path)
        .map_err(io_err(path))?
        .components()
        .collect())
}
