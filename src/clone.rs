use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::config::CloneConfig;
use crate::search::RepositoryDescriptor;

#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("clone of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
    #[error("clone of {url} failed: {message}")]
    Failed { url: String, message: String },
    #[error("could not prepare {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Materializes a repository on local disk.
#[async_trait]
pub trait RepositoryCloner {
    /// Clone `repo` to `destination`, returning the path of the working tree.
    async fn clone_repository(
        &self,
        repo: &RepositoryDescriptor,
        destination: &Path,
    ) -> Result<PathBuf, CloneError>;
}

/// Shallow `git clone` bounded by a timeout.
#[derive(Debug, Clone)]
pub struct GitCloner {
    command: String,
    depth: u32,
    timeout: Duration,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new(&CloneConfig::default())
    }
}

impl GitCloner {
    pub fn new(config: &CloneConfig) -> Self {
        Self {
            command: config.command.clone(),
            depth: config.depth.max(1),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_repository(
        &self,
        repo: &RepositoryDescriptor,
        destination: &Path,
    ) -> Result<PathBuf, CloneError> {
        if destination.exists() {
            tokio::fs::remove_dir_all(destination)
                .await
                .map_err(|source| CloneError::Destination {
                    path: destination.to_path_buf(),
                    source,
                })?;
        }

        let depth = self.depth.to_string();
        let mut cmd = Command::new(&self.command);
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .args(["clone", "--depth", depth.as_str(), "--quiet"])
            .arg(&repo.url)
            .arg(destination)
            .kill_on_drop(true);

        debug!("Cloning {} into {}", repo.url, destination.display());

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|source| CloneError::Spawn {
                command: self.command.clone(),
                source,
            })?,
            Err(_) => {
                return Err(CloneError::Timeout {
                    url: repo.url.clone(),
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(CloneError::Failed {
                url: repo.url.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(destination.to_path_buf())
    }
}
