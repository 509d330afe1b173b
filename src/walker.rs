use crate::config::ScanConfig;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Lists every regular file beneath a root, pruning version-control and
/// dependency directories.
///
/// Symbolic links are not followed, so there is no loop protection to speak
/// of and linked content is not listed. Order is whatever the platform's
/// directory listing yields.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    excluded_prefixes: Vec<String>,
    excluded_names: Vec<String>,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl TreeWalker {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            excluded_prefixes: config.excluded_dir_prefixes.clone(),
            excluded_names: config.excluded_dir_names.clone(),
        }
    }

    /// Absolute paths of all regular files under `root`.
    ///
    /// Fails if `root` is missing or any directory along the way is unreadable.
    pub fn list_files(&self, root: &Path) -> crate::Result<Vec<PathBuf>> {
        let root = root.canonicalize()?;
        let mut files = Vec::new();

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded_dir(entry));

        for result in walker {
            let entry = result?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.excluded_prefixes.iter().any(|p| name.starts_with(p.as_str()))
            || self.excluded_names.iter().any(|n| name == n.as_str())
    }
}

/// Strip `root` from each path. Paths outside `root` are dropped.
pub fn relativize(root: &Path, files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .filter_map(|f| f.strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}
