//! Filesystem infrastructure: implements the `PathResolver` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::PathResolver;
use crate::domain::error::ProvisionError;

/// Resolves paths against the home directory and the working directory.
///
/// `new()` reads both from the process environment at resolve time;
/// `with_dirs()` pins them (for testing).
#[derive(Debug, Default, Clone)]
pub struct LocalPathResolver {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl LocalPathResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dirs(home: PathBuf, cwd: PathBuf) -> Self {
        Self {
            home: Some(home),
            cwd: Some(cwd),
        }
    }

    fn home(&self) -> Option<PathBuf> {
        self.home.clone().or_else(dirs::home_dir)
    }

    fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir()
                .context("unable to get current working directory to resolve a relative path"),
        }
    }
}

impl PathResolver for LocalPathResolver {
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let expanded = expand_home(path, self.home().as_deref());
        if expanded.is_absolute() && expanded.exists() {
            return Ok(expanded);
        }

        let relative = self.cwd()?.join(path);
        if relative.exists() {
            return Ok(relative);
        }

        Err(ProvisionError::PathResolution(relative.display().to_string()).into())
    }
}

/// Expand a leading `~` or `~/` to `home`. Other paths, including
/// `~user/...`, pass through.
pub(crate) fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    let home = home.and_then(Path::to_str);
    PathBuf::from(shellexpand::tilde_with_context(path, || home).as_ref())
}
