use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a v8-prep run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("git user.name is empty, set it with `git config user.name`")]
    Identity,

    #[error("{}: APP_STL must be c++_shared, found `{line}`", path.display())]
    Stl { path: PathBuf, line: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach the offending path to an io error.
pub(crate) fn io_err(
    path: impl Into<PathBuf>,
) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io { path, source }
}
