use std::fs;
use std::path::{Path, PathBuf};

use crate::search::RepositoryDescriptor;

/// Per-run directory holding every clone. Left on disk unless
/// [`Workspace::cleanup`] is called.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create `<system temp>/<prefix>-<timestamp>-<pid>`.
    pub fn create(prefix: &str) -> crate::Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let root = std::env::temp_dir().join(format!("{}-{}-{}", prefix, stamp, std::process::id()));
        Self::at(root)
    }

    pub fn at(root: PathBuf) -> crate::Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<owner>-<name>`
    pub fn clone_path(&self, repo: &RepositoryDescriptor) -> PathBuf {
        self.root.join(format!(
            "{}-{}",
            sanitize(&repo.owner),
            sanitize(&repo.name)
        ))
    }

    pub fn cleanup(self) -> crate::Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clone_path_is_owner_dash_name() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::at(dir.path().join("run")).unwrap();
        let repo = RepositoryDescriptor {
            owner: "holman".to_string(),
            name: "dotfiles".to_string(),
            url: "https://github.com/holman/dotfiles".to_string(),
            description: None,
            stars: 1,
            language: None,
        };

        assert_eq!(
            workspace.clone_path(&repo),
            dir.path().join("run").join("holman-dotfiles")
        );
    }

    #[test]
    fn test_cleanup_removes_root() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::at(dir.path().join("run")).unwrap();
        fs::write(workspace.root().join("file"), "x").unwrap();
        let root = workspace.root().to_path_buf();

        workspace.cleanup().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_create_uses_prefix() {
        let workspace = Workspace::create("repo-scout-test").unwrap();
        let name = workspace.root().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("repo-scout-test-"));
        workspace.cleanup().unwrap();
    }
}
