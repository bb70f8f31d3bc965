use crate::config::{Config, Remote};
use crate::error::{io_err, Error, Result};
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Version control operations needed to provision the V8 checkout.
pub trait Vcs {
    /// The configured user name, or an empty string if there is none.
    fn user_name(&self) -> String;

    /// Clone `url` into a new directory inside `dir`.
    fn clone_repo(&self, url: &str, dir: &Path) -> std::io::Result<()>;
}

/// `Vcs` backed by the git command line.
pub struct Git {
    program: String,
}

impl Git {
    pub fn new(program: &str) -> Git {
        Git {
            program: program.to_owned(),
        }
    }
}

impl Vcs for Git {
    fn user_name(&self) -> String {
        match Command::new(&self.program)
            .args(["config", "user.name"])
            .output()
        {
            Ok(out) => String::from_utf8_lossy(&out.stdout).trim().to_owned(),
            Err(e) => {
                debug!("{} config user.name failed: {}", self.program, e);
                String::new()
            }
        }
    }

    fn clone_repo(&self, url: &str, dir: &Path) -> std::io::Result<()> {
        let status = Command::new(&self.program)
            .args(["clone", url])
            .current_dir(dir)
            .status()?;

        if !status.success() {
            return Err(IoError::new(
                ErrorKind::Other,
                format!("{} clone exited with {}", self.program, status),
            ));
        }
        Ok(())
    }
}

/// Make sure the V8 tools checkout exists, cloning it when it is missing.
///
/// A failed clone is only logged. Later steps that need files from the
/// checkout report the missing files themselves.
pub fn ensure_checkout(vcs: &dyn Vcs, config: &Config) -> Result<()> {
    let tools = &config.v8_tools_path;
    if tools.exists() {
        info!("found V8 tools at {}", tools.display());
        return Ok(());
    }

    let user = vcs.user_name();
    let user = user.trim();
    if user.is_empty() {
        return Err(Error::Identity);
    }

    let url = clone_url(user, &config.settings.remote);
    let parent = checkout_parent(tools);
    std::fs::create_dir_all(&parent).map_err(io_err(&parent))?;

    info!("cloning {} into {}", url, parent.display());
    if let Err(e) = vcs.clone_repo(&url, &parent) {
        warn!("clone of {} failed: {}", url, e);
    }
    Ok(())
}

/// SSH url of the V8 tools repository for the given user.
pub fn clone_url(user: &str, remote: &Remote) -> String {
    format!(
        "ssh://{}@{}:{}/{}",
        user, remote.host, remote.port, remote.repository
    )
}

/// Directory the checkout is cloned from: the tools path cut off at its
/// last `v8`. Paths without `v8` in them use their parent directory.
pub fn checkout_parent(tools: &Path) -> PathBuf {
    let s = tools.to_string_lossy();
    match s.rfind("v8") {
        Some(idx) => PathBuf::from(&s[..idx]),
        None => tools.parent().unwrap_or(tools).to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeVcs {
        user: String,
        fail_clone: bool,
        user_queries: RefCell<usize>,
        clones: RefCell<Vec<(String, PathBuf)>>,
    }

    impl Vcs for FakeVcs {
        fn user_name(&self) -> String {
            *self.user_queries.borrow_mut() += 1;
            self.user.clone()
        }

        fn clone_repo(&self, url: &str, dir: &Path) -> std::io::Result<()> {
            self.clones.borrow_mut().push((url.to_owned(), dir.to_owned()));
            if self.fail_clone {
                return Err(IoError::new(ErrorKind::Other, "unreachable host"));
            }
            Ok(())
        }
    }

    fn config(root: &Path, tools: &Path) -> Config {
        Config::new(root, tools, Settings::default()).unwrap()
    }

    #[test]
    fn test_existing_checkout_is_not_cloned() {
        let root = TempDir::new().unwrap();
        let tools = root.path().join("external/v8-tools");
        std::fs::create_dir_all(&tools).unwrap();
        let vcs = FakeVcs {
            user: "dev".into(),
            ..Default::default()
        };

        ensure_checkout(&vcs, &config(root.path(), &tools)).unwrap();
        assert!(vcs.clones.borrow().is_empty());
        assert_eq!(*vcs.user_queries.borrow(), 0);
    }

    #[test]
    fn test_missing_checkout_is_cloned() {
        let root = TempDir::new().unwrap();
        let tools = root.path().join("external/v8-tools");
        let vcs = FakeVcs {
            user: "dev\n".into(),
            ..Default::default()
        };

        ensure_checkout(&vcs, &config(root.path(), &tools)).unwrap();
        let clones = vcs.clones.borrow();
        assert_eq!(clones.len(), 1);
        assert_eq!(clones[0].0, "ssh://dev@git.hapjs.org:29418/v8-tools");
        assert_eq!(clones[0].1, checkout_parent(&tools));
        assert!(root.path().join("external").is_dir());
    }

    #[test]
    fn test_empty_user_is_fatal() {
        let root = TempDir::new().unwrap();
        let tools = root.path().join("external/v8-tools");
        let vcs = FakeVcs {
            user: "  ".into(),
            ..Default::default()
        };

        let err = ensure_checkout(&vcs, &config(root.path(), &tools));
        assert!(matches!(err, Err(Error::Identity)));
        assert!(vcs.clones.borrow().is_empty());
    }

    #[test]
    fn test_failed_clone_is_not_fatal() {
        let root = TempDir::new().unwrap();
        let tools = root.path().join("external/v8-tools");
        let vcs = FakeVcs {
            user: "dev".into(),
            fail_clone: true,
            ..Default::default()
        };

        ensure_checkout(&vcs, &config(root.path(), &tools)).unwrap();
        assert_eq!(vcs.clones.borrow().len(), 1);
    }

    #[test]
    fn test_checkout_parent() {
        assert_eq!(
            checkout_parent(Path::new("/src/external/v8-tools")),
            PathBuf::from("/src/external/")
        );
        assert_eq!(
            checkout_parent(Path::new("/v8/deps/v8")),
            PathBuf::from("/v8/deps/")
        );
        assert_eq!(
            checkout_parent(Path::new("/src/external/tools")),
            PathBuf::from("/src/external")
        );
    }

    #[test]
    fn test_clone_url_uses_remote() {
        let remote = Remote {
            host: "example.org".into(),
            port: 22,
            repository: "mirrors/v8.git".into(),
        };
        assert_eq!(
            clone_url("alice", &remote),
            "ssh://alice@example.org:22/mirrors/v8.git"
        );
    }
}
