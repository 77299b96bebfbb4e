//! Loads the provisioning file from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::PathResolver;
use crate::domain::config::ProvisionFile;

/// Environment variable naming the provisioning file.
pub const CONFIG_ENV: &str = "ANSIBLE_PROVISION_CONFIG";

/// File looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "provision.yaml";

/// A YAML provisioning file on disk.
pub struct YamlConfigFile {
    path: PathBuf,
}

impl YamlConfigFile {
    /// Locate the file from an explicit path, `ANSIBLE_PROVISION_CONFIG`,
    /// or `provision.yaml`, in that order, resolved through `resolver`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen path does not exist.
    pub fn locate(explicit: Option<&str>, resolver: &impl PathResolver) -> Result<Self> {
        let requested = match explicit {
            Some(path) => path.to_string(),
            None => std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string()),
        };
        let path = resolver
            .resolve(&requested)
            .with_context(|| format!("cannot find provisioning file {requested}"))?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. Unknown keys are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<ProvisionFile> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}
