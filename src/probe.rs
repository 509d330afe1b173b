use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const NO_EXTENSION: &str = "no-extension";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestKind {
    #[serde(rename = "package.json")]
    PackageJson,
    #[serde(rename = "Cargo.toml")]
    CargoToml,
    #[serde(rename = "pyproject.toml")]
    PyprojectToml,
}

impl ManifestKind {
    fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "package.json" => Some(ManifestKind::PackageJson),
            "Cargo.toml" => Some(ManifestKind::CargoToml),
            "pyproject.toml" => Some(ManifestKind::PyprojectToml),
            _ => None,
        }
    }

    fn parse(self, content: &str) -> Option<serde_json::Value> {
        match self {
            ManifestKind::PackageJson => serde_json::from_str(content).ok(),
            ManifestKind::CargoToml | ManifestKind::PyprojectToml => toml::from_str::<toml::Value>(content)
                .ok()
                .and_then(|value| serde_json::to_value(value).ok()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub kind: ManifestKind,
    /// Relative to the clone root
    pub path: PathBuf,
    /// Parsed contents, unset when the file could not be read or parsed
    pub data: Option<serde_json::Value>,
}

impl Manifest {
    /// `name` and `version` as declared, looking inside `[package]` and
    /// `[project]` tables for the TOML manifests.
    pub fn name_and_version(&self) -> (Option<&str>, Option<&str>) {
        let Some(data) = &self.data else {
            return (None, None);
        };
        let table = match self.kind {
            ManifestKind::PackageJson => Some(data),
            ManifestKind::CargoToml => data.get("package"),
            ManifestKind::PyprojectToml => data.get("project").or_else(|| {
                data.get("tool").and_then(|t| t.get("poetry"))
            }),
        };
        let field = |key: &str| table.and_then(|t| t.get(key)).and_then(|v| v.as_str());
        (field("name"), field("version"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub total_files: usize,
    /// Extension counts in first-seen order
    pub file_types: IndexMap<String, usize>,
    pub readme: Option<PathBuf>,
    pub manifest: Option<Manifest>,
    /// Immediate children of the clone root
    pub structure: IndexMap<String, EntryKind>,
}

impl AnalysisRecord {
    /// Extensions by descending count; ties keep first-seen order.
    pub fn top_file_types(&self, n: usize) -> Vec<(&str, usize)> {
        let mut types: Vec<(&str, usize)> = self
            .file_types
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1));
        types.truncate(n);
        types
    }
}

/// Outcome of probing one repository.
pub type Analysis = Result<AnalysisRecord, String>;

pub fn file_extension_key(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Best-effort inspection of a cloned repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct RepositoryProber;

impl RepositoryProber {
    pub fn new() -> Self {
        Self
    }

    /// `files` are relative to `repo_path`. Never fails: any problem ends up
    /// in the `Err` side of the returned analysis.
    pub fn probe(&self, repo_path: &Path, files: &[PathBuf]) -> Analysis {
        self.try_probe(repo_path, files).map_err(|e| format!("{:#}", e))
    }

    fn try_probe(&self, repo_path: &Path, files: &[PathBuf]) -> crate::Result<AnalysisRecord> {
        let mut record = AnalysisRecord {
            total_files: files.len(),
            ..AnalysisRecord::default()
        };

        for file in files {
            *record.file_types.entry(file_extension_key(file)).or_insert(0) += 1;
        }

        record.readme = files
            .iter()
            .find(|f| {
                f.file_name()
                    .map(|n| n.to_string_lossy().to_lowercase().contains("readme"))
                    .unwrap_or(false)
            })
            .cloned();

        record.manifest = files.iter().find_map(|f| {
            let kind = ManifestKind::from_file_name(&f.file_name()?.to_string_lossy())?;
            let data = fs::read_to_string(repo_path.join(f))
                .ok()
                .and_then(|content| kind.parse(&content));
            Some(Manifest {
                kind,
                path: f.clone(),
                data,
            })
        });

        for entry in fs::read_dir(repo_path)? {
            let entry = entry?;
            let kind = if entry.file_type()?.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            record
                .structure
                .insert(entry.file_name().to_string_lossy().into_owned(), kind);
        }

        Ok(record)
    }
}
